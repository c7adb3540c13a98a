//! The asset listing of an exported scene, as read from its config file.

use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use sogswap_asset::{
    AssetDescriptor, AssetId, AssetKind, AssetRegistry, SourceLocator, TextureChannel,
    last_segment, strip_query,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum ListingError {
    #[snafu(display("failed to read asset listing {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("asset listing is malformed: {source}"))]
    Json { source: serde_json::Error },
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ListedFile {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl ListedFile {
    pub fn locator(&self) -> SourceLocator {
        match &self.filename {
            Some(filename) => {
                SourceLocator::with_parts(self.url.clone(), filename.clone(), self.hash.clone())
            }
            None => SourceLocator::with_parts(
                self.url.clone(),
                last_segment(&self.url),
                self.hash.clone(),
            ),
        }
    }
}

fn preload_default() -> bool {
    true
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ListedAsset {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AssetKind,
    #[serde(default)]
    pub file: Option<ListedFile>,
    #[serde(default = "preload_default")]
    pub preload: bool,
}

impl ListedAsset {
    pub fn descriptor(&self) -> AssetDescriptor {
        let source = self.file.as_ref().map(ListedFile::locator);
        let channel = source.as_ref().and_then(|source| {
            let file = strip_query(source.filename());
            let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
            TextureChannel::from_name(stem)
        });

        let mut asset = AssetDescriptor::new(self.name.clone(), self.kind, source);
        asset.preload = self.preload;
        match channel {
            Some(channel) if self.kind == AssetKind::Texture => asset.with_channel(channel),
            _ => asset,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListedAssets {
    List(Vec<ListedAsset>),
    /// Keyed by asset id.
    Map(BTreeMap<String, ListedAsset>),
}

#[derive(Debug, Deserialize)]
struct RawListing {
    assets: ListedAssets,
}

/// Assets in listing order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AssetListing {
    pub assets: Vec<ListedAsset>,
}

impl AssetListing {
    /// Accepts `{"assets": [...]}` as well as `{"assets": {"<id>": {...}}}`.
    pub fn from_json(bytes: &[u8]) -> Result<AssetListing, ListingError> {
        let raw: RawListing = serde_json::from_slice(bytes).context(JsonErr)?;
        let assets = match raw.assets {
            ListedAssets::List(assets) => assets,
            ListedAssets::Map(assets) => assets.into_values().collect(),
        };
        Ok(AssetListing { assets })
    }

    pub fn read(path: impl AsRef<Path>) -> Result<AssetListing, ListingError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).context(ReadErr { path })?;
        Self::from_json(&bytes)
    }

    /// Adds every listed asset to `registry`, running its add hooks.
    pub fn register_into(&self, registry: &mut AssetRegistry) -> Vec<AssetId> {
        let ids: Vec<AssetId> = self
            .assets
            .iter()
            .map(|asset| registry.add(asset.descriptor()))
            .collect();
        debug!("Registered {} listed assets", ids.len());
        ids
    }
}
