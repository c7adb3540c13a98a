mod asset_registry;

pub use self::asset_registry::*;
