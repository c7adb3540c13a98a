//! Asset data types.
//!
//! Texture assets are described by an [`AssetDescriptor`] whose [`SourceLocator`] says where
//! the payload is fetched from. Once loaded, the descriptor owns a [`TextureResource`].

mod channel;
mod descriptor;
mod locator;
mod sampler;
mod texture;

pub use self::channel::*;
pub use self::descriptor::*;
pub use self::locator::*;
pub use self::sampler::*;
pub use self::texture::*;
