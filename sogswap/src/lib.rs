//! Serves the data textures of Gaussian splat scenes as ASTC compressed KTX2 files instead of
//! WebP, by retargeting the scene's texture assets before or while they load.
//!
//! The entry point is [`SwapContext`]. It owns the [`AssetRegistry`](sogswap_asset::AssetRegistry)
//! and the [`ResourceLoader`](loading::ResourceLoader) and installs the remap strategies in
//! the right order:
//!
//! ```no_run
//! use std::rc::Rc;
//! use sogswap::loading::{FsFetcher, ResourceLoader, TextureHandler, WebpParser};
//! use sogswap::{SwapConfig, SwapContext};
//!
//! let handler = TextureHandler::new(Rc::new(FsFetcher::new("public"))).with_parser(WebpParser);
//! let mut context = SwapContext::new(&SwapConfig::default(), ResourceLoader::with_texture_handler(handler));
//! context.probe(&["WEBGL_compressed_texture_astc"]);
//! let report = context.install();
//! println!("rewrote {} assets", report.remap.rewritten);
//! ```

extern crate self as sogswap;

pub mod config;
pub mod engine;

pub use config::*;
pub use engine::*;

pub use ::sogswap_asset;
pub use ::tracing;
