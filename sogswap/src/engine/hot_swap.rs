//! Replaces the textures of an already built splat with the ones listed in a KTX2 manifest.
//!
//! Every listed channel is loaded before anything is touched. A single failed load aborts
//! the whole swap, so a splat never ends up with a mix of old and new textures.

use crate::fixup::configure_data_texture;
use crate::loading::{FetchError, Fetcher, LoadError, LoadRequest, ResourceLoader, TEXTURE};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use sogswap_asset::{SourceLocator, TextureChannel, TextureResource};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const MANIFEST_FILE: &str = "manifest_ktx2.json";

/// Frames a replaced texture is kept alive after it was swapped out.
pub const RETIRE_AFTER_FRAMES: u64 = 3;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum ManifestError {
    #[snafu(display("failed to fetch manifest {url}: {source}"))]
    Fetch { url: String, source: FetchError },

    #[snafu(display("manifest {url} is malformed: {source}"))]
    Json {
        url: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum HotSwapError {
    #[snafu(display("{source}"))]
    Manifest { source: ManifestError },

    #[snafu(display("failed to load {channel} texture: {source}"))]
    Load {
        channel: TextureChannel,
        source: LoadError,
    },
}

/// `{"images": {"means_l": "means_l.ktx2", ...}}`, file names relative to the manifest.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ktx2Manifest {
    #[serde(default)]
    pub images: BTreeMap<String, String>,
}

impl Ktx2Manifest {
    pub fn file_for(&self, channel: TextureChannel) -> Option<&str> {
        self.images
            .get(channel.base_name())
            .map(String::as_str)
            .filter(|file| !file.is_empty())
    }

    /// Listed channels in declaration order, with their file names.
    pub fn channels(&self) -> impl Iterator<Item = (TextureChannel, &str)> {
        TextureChannel::ALL
            .into_iter()
            .filter_map(|channel| self.file_for(channel).map(|file| (channel, file)))
    }
}

/// The data container of a built splat, as far as swapping textures is concerned.
pub trait SplatTarget {
    /// Swaps in `texture` and returns the texture it replaced.
    ///
    /// Targets without a texture for `channel` return `None` and stay unchanged.
    fn replace_texture(
        &mut self,
        channel: TextureChannel,
        texture: TextureResource,
    ) -> Option<TextureResource>;

    /// Called once after all textures were replaced.
    fn rebuild(&mut self) {}
}

/// A plain texture set, keyed by channel.
#[derive(Debug, Default)]
pub struct SplatTextures {
    textures: BTreeMap<TextureChannel, TextureResource>,
    rebuilds: u32,
}

impl SplatTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, channel: TextureChannel, texture: TextureResource) {
        self.textures.insert(channel, texture);
    }

    pub fn get(&self, channel: TextureChannel) -> Option<&TextureResource> {
        self.textures.get(&channel)
    }

    pub fn rebuilds(&self) -> u32 {
        self.rebuilds
    }
}

impl SplatTarget for SplatTextures {
    fn replace_texture(
        &mut self,
        channel: TextureChannel,
        texture: TextureResource,
    ) -> Option<TextureResource> {
        let slot = self.textures.get_mut(&channel)?;
        Some(std::mem::replace(slot, texture))
    }

    fn rebuild(&mut self) {
        self.rebuilds += 1;
    }
}

/// Textures that were swapped out but may still be referenced by frames in flight.
#[derive(Debug, Default)]
pub struct RetiredTextures {
    frame: u64,
    pending: Vec<(u64, TextureResource)>,
}

impl RetiredTextures {
    pub fn retire(&mut self, texture: TextureResource) {
        self.pending
            .push((self.frame + RETIRE_AFTER_FRAMES, texture));
    }

    /// Advances the frame counter and drops what has outlived its grace period.
    /// Returns how many textures were released.
    pub fn end_frame(&mut self) -> usize {
        self.frame += 1;
        let before = self.pending.len();
        let frame = self.frame;
        self.pending.retain(|(release_at, _)| *release_at > frame);
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct HotSwapReport {
    pub manifest: Ktx2Manifest,
    pub replaced: Vec<TextureChannel>,
    /// Loaded, but the target had no texture for them.
    pub skipped: Vec<TextureChannel>,
}

/// Loads the textures of a KTX2 manifest through the texture handler.
pub struct HotSwap<'a> {
    loader: &'a ResourceLoader,
    fetcher: &'a dyn Fetcher,
}

impl<'a> HotSwap<'a> {
    pub fn new(loader: &'a ResourceLoader, fetcher: &'a dyn Fetcher) -> Self {
        Self { loader, fetcher }
    }

    pub async fn fetch_manifest(&self, base_url: &str) -> Result<Ktx2Manifest, ManifestError> {
        let url = format!("{}/{MANIFEST_FILE}", base_url.trim_end_matches('/'));
        let bytes = self.fetcher.fetch(&url).await.context(FetchErr { url: &url })?;
        serde_json::from_slice(&bytes).context(JsonErr { url })
    }

    /// Fetches the manifest and loads every listed channel concurrently.
    pub async fn load(
        &self,
        base_url: &str,
    ) -> Result<(Ktx2Manifest, Vec<(TextureChannel, TextureResource)>), HotSwapError> {
        info!("Loading KTX2 textures from {base_url}");
        let manifest = self.fetch_manifest(base_url).await.context(ManifestErr)?;
        debug!("Loaded manifest {manifest:?}");

        let base = base_url.trim_end_matches('/');
        let loads = manifest.channels().map(|(channel, file)| {
            let source = SourceLocator::with_parts(format!("{base}/{file}"), file, None);
            let load = self.loader.load(TEXTURE, LoadRequest::new(source));
            async move {
                let mut loaded = load.await.context(LoadErr { channel })?;
                configure_data_texture(&mut loaded.resource);
                debug!("Loaded {channel} texture from {}", loaded.resolved.url());
                Ok::<_, HotSwapError>((channel, loaded.resource))
            }
        });

        let textures = try_join_all(loads).await?;
        Ok((manifest, textures))
    }
}

/// Swaps loaded textures into `target` and retires the ones they replace.
pub fn apply_textures(
    textures: Vec<(TextureChannel, TextureResource)>,
    target: &mut dyn SplatTarget,
    retired: &mut RetiredTextures,
) -> (Vec<TextureChannel>, Vec<TextureChannel>) {
    let mut replaced = Vec::new();
    let mut skipped = Vec::new();

    for (channel, texture) in textures {
        match target.replace_texture(channel, texture) {
            Some(old) => {
                retired.retire(old);
                debug!("Replaced {} texture", channel.property_name());
                replaced.push(channel);
            }
            None => skipped.push(channel),
        }
    }

    target.rebuild();
    (replaced, skipped)
}
