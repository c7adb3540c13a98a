use crate::{FormatVariant, SourceLocator, TextureChannel, TextureResource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Texture,
    Json,
    Gsplat,
    #[serde(other)]
    Other,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

/// One resource tracked by the [`AssetRegistry`](crate::AssetRegistry).
///
/// The registry owns the descriptor. The swap logic only ever retargets its source (which
/// resets the load state) and adjusts the sampler of its texture once it is loaded.
#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    name: String,
    kind: AssetKind,
    channel: Option<TextureChannel>,
    source: Option<SourceLocator>,
    state: LoadState,
    resource: Option<TextureResource>,
    generation: u64,
    pub preload: bool,
}

impl AssetDescriptor {
    pub fn new(name: impl Into<String>, kind: AssetKind, source: Option<SourceLocator>) -> Self {
        Self {
            name: name.into(),
            kind,
            channel: None,
            source,
            state: LoadState::Unloaded,
            resource: None,
            generation: 0,
            preload: true,
        }
    }

    pub fn texture(name: impl Into<String>, source: SourceLocator) -> Self {
        Self::new(name, AssetKind::Texture, Some(source))
    }

    pub fn with_channel(mut self, channel: TextureChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn is_texture(&self) -> bool {
        self.kind == AssetKind::Texture
    }

    pub fn channel(&self) -> Option<TextureChannel> {
        self.channel
    }

    pub fn source(&self) -> Option<&SourceLocator> {
        self.source.as_ref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn resource(&self) -> Option<&TextureResource> {
        self.resource.as_ref()
    }

    pub fn resource_mut(&mut self) -> Option<&mut TextureResource> {
        self.resource.as_mut()
    }

    /// Bumped on every retarget. Load results issued under an older generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The variant the current source points at, if it points at a known one.
    pub fn variant(&self) -> Option<FormatVariant> {
        self.source
            .as_ref()
            .and_then(|source| FormatVariant::from_path(source.url()))
    }

    /// Points the asset at a new source and marks it for a fresh load.
    ///
    /// Any load still in flight for the previous source becomes stale. The last decoded
    /// resource stays in place so the scene keeps rendering until the new one arrives.
    pub fn retarget(&mut self, source: SourceLocator) {
        self.source = Some(source);
        self.state = LoadState::Unloaded;
        self.generation += 1;
    }

    pub(crate) fn mark_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Like [`Self::mark_loaded`], `resolved` is the locator the failed request targeted.
    pub(crate) fn mark_failed(&mut self, resolved: SourceLocator) {
        self.adopt_resolved(resolved);
        self.state = LoadState::Failed;
    }

    /// Stores a freshly decoded resource. `resolved` replaces the source when the fetch
    /// was served from a different locator than the one the descriptor held.
    pub(crate) fn mark_loaded(&mut self, resource: TextureResource, resolved: SourceLocator) {
        self.adopt_resolved(resolved);
        self.resource = Some(resource);
        self.state = LoadState::Loaded;
    }

    fn adopt_resolved(&mut self, resolved: SourceLocator) {
        if self.source.as_ref() != Some(&resolved) {
            self.source = Some(resolved);
        }
    }
}
