//! [`SwapContext`] ties the registry, the loader and the remap strategies together.
//!
//! Installation order matters and is fixed by [`SwapContext::install`]: the decoder is
//! registered first, then the texture handler is wrapped, then the add hook is installed and
//! finally the already registered assets are remapped. Any of the three remap modes can be
//! switched off through [`ActivationModes`].

use crate::capability::{CapabilityFlag, GraphicsContext, probe_compressed_texture_support};
use crate::config::SwapConfig;
use crate::events::{EVENT_CAPACITY, SwapEvent};
use crate::fixup::{FixupOutcome, PostLoadFixup};
use crate::hot_swap::{
    HotSwap, HotSwapError, HotSwapReport, RetiredTextures, SplatTarget, apply_textures,
};
use crate::loading::{
    Fetcher, InterceptingHandler, Ktx2Parser, LoadError, LoadFuture, LoadRequest, LoadedTexture,
    LoaderError, RegistrationShape, ResourceLoader, TEXTURE,
};
use crate::remap_table::RemapTable;
use crate::remapper::{AssetRemapper, RemapOnAdd, RemapReport};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use once_cell::unsync::OnceCell;
use sogswap_asset::{
    AssetId, AssetRegistry, FormatVariant, LoadOutcome, LoadState, LoadTicket, SourceLocator,
};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Which of the remap strategies are installed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ActivationModes {
    /// Rewrite the assets registered before installation.
    pub eager: bool,
    /// Redirect load requests in the texture handler.
    pub intercept: bool,
    /// Rewrite assets as they are added.
    pub add_hook: bool,
}

impl Default for ActivationModes {
    fn default() -> Self {
        Self {
            eager: true,
            intercept: true,
            add_hook: true,
        }
    }
}

/// What happens to an asset whose compressed variant failed to load.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// The asset stays failed on its compressed locator.
    #[default]
    Surface,
    /// The asset goes back to its default locator and is not remapped again.
    RevertToDefault,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct InstallReport {
    /// How the KTX2 parser was registered, `None` if it could not be.
    pub decoder: Option<RegistrationShape>,
    pub intercepting: bool,
    pub add_hook: bool,
    pub remap: RemapReport,
}

pub struct SwapContext {
    registry: AssetRegistry,
    loader: ResourceLoader,
    remapper: Rc<AssetRemapper>,
    fixup: PostLoadFixup,
    capability: OnceCell<CapabilityFlag>,
    modes: ActivationModes,
    policy: FailurePolicy,
    intercepting: bool,
    hooked: bool,
    retired: RetiredTextures,
    event_tx: Sender<SwapEvent>,
    event_rx: Receiver<SwapEvent>,
}

impl SwapContext {
    pub fn new(config: &SwapConfig, loader: ResourceLoader) -> Self {
        Self::with_registry(config, loader, AssetRegistry::new())
    }

    pub fn with_registry(
        config: &SwapConfig,
        loader: ResourceLoader,
        registry: AssetRegistry,
    ) -> Self {
        let table = Arc::new(RemapTable::new(&config.remap));
        let (event_tx, event_rx) = bounded(EVENT_CAPACITY);

        Self {
            registry,
            loader,
            remapper: Rc::new(AssetRemapper::new(table.clone())),
            fixup: PostLoadFixup::new(table),
            capability: OnceCell::new(),
            modes: config.modes,
            policy: config.policy,
            intercepting: false,
            hooked: false,
            retired: RetiredTextures::default(),
            event_tx,
            event_rx,
        }
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AssetRegistry {
        &mut self.registry
    }

    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    pub fn remapper(&self) -> &AssetRemapper {
        &self.remapper
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Probes the graphics context once. Later calls return the first result.
    pub fn probe(&self, context: &(impl GraphicsContext + ?Sized)) -> CapabilityFlag {
        *self
            .capability
            .get_or_init(|| probe_compressed_texture_support(context))
    }

    /// The probed capability, unsupported if [`Self::probe`] was never called.
    pub fn capability(&self) -> CapabilityFlag {
        self.capability.get().copied().unwrap_or_default()
    }

    /// Registers the KTX2 parser with the texture handler.
    pub fn register_decoder(&mut self) -> Result<RegistrationShape, LoaderError> {
        let capability = self.capability();
        let result = self
            .loader
            .register_parser(TEXTURE, Rc::new(Ktx2Parser::new(capability)));
        self.remapper.refresh_decoder(&self.loader);

        if result.is_ok() {
            if capability.is_supported() {
                info!("KTX2 textures will be decoded by the GPU");
            } else {
                info!("KTX2 textures will be expanded to RGBA before upload");
            }
        }
        result
    }

    /// Registers the decoder and installs the enabled remap modes.
    ///
    /// Calling this again is harmless: nothing is wrapped or hooked twice and remapped
    /// assets stay as they are.
    pub fn install(&mut self) -> InstallReport {
        let decoder = self.register_decoder().ok();

        if self.modes.intercept && !self.intercepting {
            let remapper = self.remapper.clone();
            self.intercepting = self.loader.wrap_handler(TEXTURE, move |inner| {
                Box::new(InterceptingHandler::new(inner, remapper))
            });
            if !self.intercepting {
                warn!("There is no texture handler to intercept");
            }
        }

        if self.modes.add_hook && !self.hooked {
            self.registry.add_hook(RemapOnAdd(self.remapper.clone()));
            self.hooked = true;
        }

        let remap = if self.modes.eager {
            self.remap_registered()
        } else {
            RemapReport::default()
        };

        self.log_texture_sources();

        InstallReport {
            decoder,
            intercepting: self.intercepting,
            add_hook: self.hooked,
            remap,
        }
    }

    /// One pass of the registration-time remapper.
    pub fn remap_registered(&mut self) -> RemapReport {
        self.remapper.refresh_decoder(&self.loader);
        self.remapper.remap_registered(&mut self.registry)
    }

    pub fn begin_load(&mut self, id: AssetId) -> Option<LoadTicket> {
        if !self.registry.get(id)?.is_texture() {
            return None;
        }
        self.registry.begin_load(id)
    }

    /// Starts fetching the payload a ticket was issued for.
    pub fn dispatch(&self, ticket: &LoadTicket) -> LoadFuture<'_> {
        self.loader.load(
            TEXTURE,
            LoadRequest::for_asset(ticket.source.clone(), ticket.id),
        )
    }

    /// Hands a load result back to its asset.
    ///
    /// Results for a source the asset no longer points at are dropped.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<LoadedTexture, LoadError>,
    ) -> LoadOutcome {
        match result {
            Ok(LoadedTexture { resource, resolved }) => {
                let url = resolved.url().to_string();
                let outcome = self.registry.complete_load(ticket, resource, resolved.clone());
                if outcome != LoadOutcome::Loaded {
                    return outcome;
                }
                self.remember_redirect(ticket, &resolved);

                if let Some(asset) = self.registry.get_mut(ticket.id) {
                    if let FixupOutcome::Applied(channel) = self.fixup.apply(asset) {
                        info!("Loaded {channel} texture {} from {url}", asset.name());
                    } else {
                        debug!("Loaded {} from {url}", asset.name());
                    }
                }
                self.send(SwapEvent::AssetLoaded { id: ticket.id, url });
                outcome
            }
            Err(err) => {
                let resolved = err.locator().clone();
                let outcome = self.registry.fail_load(ticket, resolved.clone());
                if outcome != LoadOutcome::Failed {
                    return outcome;
                }
                self.remember_redirect(ticket, &resolved);

                error!("Failed to load {}: {err}", ticket.source.url());
                self.send(SwapEvent::AssetFailed {
                    id: ticket.id,
                    url: resolved.url().to_string(),
                    error: err.to_string(),
                });

                if self.policy == FailurePolicy::RevertToDefault
                    && FormatVariant::from_path(resolved.url()) == Some(FormatVariant::Compressed)
                {
                    self.revert(ticket.id);
                }
                outcome
            }
        }
    }

    /// Loads one texture asset. Returns `None` if no load was started.
    pub async fn load_asset(&mut self, id: AssetId) -> Option<LoadOutcome> {
        let ticket = self.begin_load(id)?;
        let result = self.dispatch(&ticket).await;
        Some(self.finish_load(&ticket, result))
    }

    /// Loads every unloaded texture asset marked for preload, in registry order.
    pub async fn preload(&mut self) -> Vec<(AssetId, LoadOutcome)> {
        let pending: Vec<AssetId> = self
            .registry
            .list()
            .filter(|(_, asset)| {
                asset.is_texture() && asset.preload && asset.state() == LoadState::Unloaded
            })
            .map(|(id, _)| id)
            .collect();

        let mut outcomes = Vec::with_capacity(pending.len());
        for id in pending {
            if let Some(outcome) = self.load_asset(id).await {
                outcomes.push((id, outcome));
            }
        }
        outcomes
    }

    /// Loads the textures listed in `<base_url>/manifest_ktx2.json` and swaps them into
    /// `target`. Without a base URL the configured KTX2 directory is used.
    pub async fn hot_swap(
        &mut self,
        fetcher: &dyn Fetcher,
        base_url: Option<&str>,
        target: &mut dyn SplatTarget,
    ) -> Result<HotSwapReport, HotSwapError> {
        let base_url = base_url
            .unwrap_or(self.remapper.table().base_dir())
            .to_string();

        let loaded = HotSwap::new(&self.loader, fetcher).load(&base_url).await;
        let (manifest, textures) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                error!("Failed to load KTX2 textures: {err}");
                self.send(SwapEvent::HotSwapFailed {
                    error: err.to_string(),
                });
                return Err(err);
            }
        };

        let (replaced, skipped) = apply_textures(textures, target, &mut self.retired);
        info!("Swapped in {} KTX2 textures", replaced.len());
        self.send(SwapEvent::HotSwapLoaded {
            channels: replaced.clone(),
        });

        Ok(HotSwapReport {
            manifest,
            replaced,
            skipped,
        })
    }

    /// Releases swapped out textures whose grace period is over.
    pub fn end_frame(&mut self) -> usize {
        self.retired.end_frame()
    }

    pub fn retired_textures(&self) -> &RetiredTextures {
        &self.retired
    }

    /// Pending notifications. At most [`EVENT_CAPACITY`] are kept, newer ones are dropped
    /// until the queue is drained.
    pub fn events(&self) -> &Receiver<SwapEvent> {
        &self.event_rx
    }

    /// Source locators of all texture assets, in registry order.
    pub fn texture_sources(&self) -> Vec<(String, SourceLocator)> {
        self.registry
            .list()
            .filter(|(_, asset)| asset.is_texture())
            .filter_map(|(_, asset)| Some((asset.name().to_string(), asset.source()?.clone())))
            .collect()
    }

    /// A redirected load moves the asset to the alternate locator. The locator the load
    /// was issued for becomes its default.
    fn remember_redirect(&self, ticket: &LoadTicket, resolved: &SourceLocator) {
        if *resolved != ticket.source {
            self.remapper.remember_original(ticket.id, ticket.source.clone());
        }
    }

    fn revert(&mut self, id: AssetId) {
        let Some(asset) = self.registry.get_mut(id) else {
            return;
        };
        if let Some(source) = self.remapper.revert(id, asset) {
            self.send(SwapEvent::AssetReverted {
                id,
                url: source.url().to_string(),
            });
        }
    }

    fn log_texture_sources(&self) {
        let table = self.remapper.table();
        for (name, source) in self.texture_sources() {
            if table.channel_of_alternate(&source).is_some() {
                debug!("{name}: {}", source.url());
            } else if self.remapper.decoder_ready() && table.resolve_locator(&source).is_some() {
                warn!("{name} still loads its WebP variant from {}", source.url());
            }
        }
    }

    fn send(&self, event: SwapEvent) {
        if let Err(TrySendError::Full(event)) = self.event_tx.try_send(event) {
            trace!("Event queue is full, dropping {event:?}");
        }
    }
}
