//! Plain data the texture swap works on.
//!
//! The [`AssetRegistry`] owns every [`AssetDescriptor`]; everything else in `sogswap` only
//! borrows descriptors to retarget their source or fix up their decoded texture.

pub mod assets;
pub mod store;

pub use assets::*;
pub use store::*;
