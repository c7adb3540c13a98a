//! Everything between a load request and a decoded texture.

pub mod fetcher;
pub mod handler;
pub mod intercept;
pub mod loader;
pub mod parsers;

pub use fetcher::*;
pub use handler::*;
pub use intercept::*;
pub use loader::*;
pub use parsers::*;
