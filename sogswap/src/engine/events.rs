use sogswap_asset::{AssetId, TextureChannel};

/// Undrained events kept per context.
pub const EVENT_CAPACITY: usize = 256;

/// Notifications about swapped textures, drained from [`SwapContext::events`](crate::SwapContext::events).
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SwapEvent {
    AssetLoaded {
        id: AssetId,
        url: String,
    },
    AssetFailed {
        id: AssetId,
        url: String,
        error: String,
    },
    /// A failed asset was put back on its default variant.
    AssetReverted {
        id: AssetId,
        url: String,
    },
    HotSwapLoaded {
        channels: Vec<TextureChannel>,
    },
    HotSwapFailed {
        error: String,
    },
}
