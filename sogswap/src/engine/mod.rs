pub mod capability;
pub mod context;
pub mod events;
pub mod fixup;
pub mod hot_swap;
pub mod listing;
pub mod loading;
pub mod remap_table;
pub mod remapper;

pub use context::*;
pub use events::*;
