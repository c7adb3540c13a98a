#![allow(dead_code)]

mod ktx2_fixture;

pub use ktx2_fixture::*;

use sogswap::loading::{HandlerSurface, MemoryFetcher, ResourceLoader, TextureHandler, WebpParser};
use sogswap::sogswap_asset::{AssetDescriptor, AssetId, AssetRegistry, SourceLocator};
use sogswap::{SwapConfig, SwapContext};
use std::io::Cursor;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub const SCENE_CHANNELS: [&str; 5] = ["means_l", "means_u", "quats", "scales", "sh0"];

pub fn webp_bytes() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::WebP)
        .expect("webp encoding");
    bytes.into_inner()
}

pub fn default_url(channel: &str) -> String {
    format!("files/assets/1044/1/{channel}.webp?t=9f2c")
}

pub fn alternate_url(channel: &str) -> String {
    format!("files/assets/astc6x6/{channel}.ktx2")
}

/// A fetcher serving both variants of the scene channels and a background image.
pub fn scene_fetcher() -> Rc<MemoryFetcher> {
    let fetcher = Rc::new(MemoryFetcher::new());
    for channel in SCENE_CHANNELS {
        fetcher.insert(default_url(channel), webp_bytes());
        fetcher.insert(
            alternate_url(channel),
            ktx2_bytes(VK_FORMAT_ASTC_6X6_UNORM_BLOCK),
        );
    }
    fetcher.insert("files/assets/2001/1/background.webp", webp_bytes());
    fetcher
}

pub fn loader(fetcher: Rc<MemoryFetcher>, surface: HandlerSurface) -> ResourceLoader {
    let handler = TextureHandler::new(fetcher)
        .with_parser(WebpParser)
        .with_surface(surface);
    ResourceLoader::with_texture_handler(handler)
}

pub fn context(fetcher: Rc<MemoryFetcher>, config: &SwapConfig) -> SwapContext {
    SwapContext::new(config, loader(fetcher, HandlerSurface::List))
}

pub fn scene_asset(channel: &str) -> AssetDescriptor {
    AssetDescriptor::texture(
        channel,
        SourceLocator::with_parts(
            default_url(channel),
            format!("{channel}.webp"),
            Some("9f2c".to_string()),
        ),
    )
}

/// Adds the five scene channels and `background.webp`, returns their ids in that order.
pub fn add_scene(registry: &mut AssetRegistry) -> Vec<AssetId> {
    let mut ids: Vec<AssetId> = SCENE_CHANNELS
        .iter()
        .map(|channel| registry.add(scene_asset(channel)))
        .collect();
    ids.push(registry.add(AssetDescriptor::texture(
        "background",
        SourceLocator::new("files/assets/2001/1/background.webp"),
    )));
    ids
}

pub fn url_of(context: &SwapContext, id: AssetId) -> String {
    context
        .registry()
        .get(id)
        .and_then(|asset| asset.source())
        .map(|source| source.url().to_string())
        .unwrap_or_default()
}

/// Counts `WARN` and `ERROR` events and keeps their messages.
#[derive(Clone, Default)]
pub struct ProblemCounter {
    count: Arc<AtomicUsize>,
    messages: Arc<Mutex<Vec<String>>>,
}

impl ProblemCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn matching(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .expect("messages lock")
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for ProblemCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level != Level::WARN && level != Level::ERROR {
            return;
        }
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.count.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().expect("messages lock").push(message);
    }
}
