use crate::remap_table::RemapTable;
use sogswap_asset::{AssetDescriptor, LoadState, SamplerState, TextureChannel, TextureResource};
use sogswap_utils::debug_panic;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FixupOutcome {
    Applied(TextureChannel),
    NotLoaded,
    NotAlternate,
    MissingResource,
}

/// Data textures are sampled texel exact: nearest filtering, no wrap, no anisotropy.
/// The sampler change only reaches the GPU through a fresh upload.
pub fn configure_data_texture(texture: &mut TextureResource) {
    texture.sampler = SamplerState::data_texture();
    texture.request_upload();
}

/// Corrects the sampling of a substituted texture once its payload has arrived.
#[derive(Debug, Clone)]
pub struct PostLoadFixup {
    table: Arc<RemapTable>,
}

impl PostLoadFixup {
    pub fn new(table: Arc<RemapTable>) -> Self {
        Self { table }
    }

    pub fn apply(&self, asset: &mut AssetDescriptor) -> FixupOutcome {
        if asset.state() != LoadState::Loaded {
            return FixupOutcome::NotLoaded;
        }
        let Some(channel) = asset
            .source()
            .and_then(|source| self.table.channel_of_alternate(source))
        else {
            return FixupOutcome::NotAlternate;
        };

        let name = asset.name().to_string();
        let Some(texture) = asset.resource_mut() else {
            debug_panic!("Loaded asset {name} has no texture resource");
            return FixupOutcome::MissingResource;
        };

        configure_data_texture(texture);
        trace!("Applied data texture sampling to {name}");

        FixupOutcome::Applied(channel)
    }
}
