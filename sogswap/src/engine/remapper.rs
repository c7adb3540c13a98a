//! Moves texture assets of the splat channels over to their compressed variant.
//!
//! Three entry points exist and any combination of them may be active at once:
//!
//! - [`AssetRemapper::remap_registered`] rewrites every asset already in the registry,
//! - [`AssetRemapper::redirect`] rewrites a single in-flight [`LoadRequest`],
//! - [`RemapOnAdd`] rewrites assets as they are added to the registry.
//!
//! All of them resolve through the same [`RemapTable`], so an asset ends up on the same
//! locator whichever of them reached it first. An asset already pointing at a compressed
//! file is never touched again.

use crate::loading::{LoadRequest, ResourceLoader};
use crate::remap_table::{RemapEntry, RemapTable};
use sogswap_asset::{
    AddHook, AssetDescriptor, AssetId, AssetRegistry, SourceLocator, TextureChannel,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counters of one pass over the registry.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RemapReport {
    /// Texture assets with a source.
    pub inspected: usize,
    pub rewritten: usize,
    pub already_remapped: usize,
    /// Matching assets left on their default variant because no decoder is registered.
    pub skipped_without_decoder: usize,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RemapResult {
    Rewritten(TextureChannel),
    AlreadyRemapped(TextureChannel),
    /// Reverted after a failed load, stays on its default variant.
    Pinned,
    NoMatch,
    NotTexture,
}

pub struct AssetRemapper {
    table: Arc<RemapTable>,
    decoder_ready: Cell<bool>,
    fallback_logged: Cell<bool>,
    originals: RefCell<HashMap<AssetId, SourceLocator>>,
    pinned: RefCell<HashSet<AssetId>>,
}

impl AssetRemapper {
    pub fn new(table: Arc<RemapTable>) -> Self {
        Self {
            table,
            decoder_ready: Cell::new(false),
            fallback_logged: Cell::new(false),
            originals: RefCell::default(),
            pinned: RefCell::default(),
        }
    }

    pub fn table(&self) -> &RemapTable {
        &self.table
    }

    pub fn decoder_ready(&self) -> bool {
        self.decoder_ready.get()
    }

    /// Records whether a decoder for the compressed variant is registered.
    ///
    /// The first time it is not, the fallback to the default variant is logged. Later
    /// observations stay silent.
    pub fn observe_decoder(&self, ready: bool) -> bool {
        self.decoder_ready.set(ready);
        if !ready && !self.fallback_logged.replace(true) {
            warn!("No KTX2 decoder is registered, splat textures stay on WebP");
        }
        ready
    }

    pub fn refresh_decoder(&self, loader: &ResourceLoader) -> bool {
        self.observe_decoder(loader.decoder_available())
    }

    /// Retargets every matching texture asset of the registry.
    pub fn remap_registered(&self, registry: &mut AssetRegistry) -> RemapReport {
        let ready = self.decoder_ready();
        let mut report = RemapReport::default();

        for id in registry.ids() {
            let Some(asset) = registry.get_mut(id) else {
                continue;
            };
            if !asset.is_texture() || asset.source().is_none() {
                continue;
            }
            report.inspected += 1;

            if !ready {
                if self.matching_entry(id, asset).is_some() {
                    report.skipped_without_decoder += 1;
                }
                continue;
            }

            match self.remap_asset(id, asset) {
                RemapResult::Rewritten(_) => report.rewritten += 1,
                RemapResult::AlreadyRemapped(_) => report.already_remapped += 1,
                _ => {}
            }
        }

        if report.rewritten > 0 {
            info!(
                "Remapped {} splat textures to {}",
                report.rewritten,
                self.table.base_dir()
            );
        }

        report
    }

    /// Retargets a single asset if it is a texture of a known channel.
    ///
    /// Does not check for a decoder, callers gate on [`Self::decoder_ready`].
    pub fn remap_asset(&self, id: AssetId, asset: &mut AssetDescriptor) -> RemapResult {
        if !asset.is_texture() {
            return RemapResult::NotTexture;
        }
        let Some(source) = asset.source() else {
            return RemapResult::NoMatch;
        };
        if let Some(channel) = self.table.channel_of_alternate(source) {
            return RemapResult::AlreadyRemapped(channel);
        }
        if self.is_pinned(id) {
            return RemapResult::Pinned;
        }
        let Some(entry) = self.table.resolve_locator(source) else {
            return RemapResult::NoMatch;
        };

        let original = source.clone();
        debug!(
            "Retargeting {} from {} to {}",
            asset.name(),
            original.url(),
            entry.alternate().url()
        );
        asset.retarget(entry.alternate().clone());
        asset.preload = true;
        self.remember_original(id, original);

        RemapResult::Rewritten(entry.channel())
    }

    /// Points a load request at the compressed variant. Returns whether it was changed.
    ///
    /// Matches anywhere in the URL, not only at its end, so payload URLs with trailing
    /// path segments are caught as well.
    pub fn redirect(&self, request: &mut LoadRequest) -> bool {
        if request.asset.is_some_and(|id| self.is_pinned(id)) {
            return false;
        }
        let Some(entry) = self.table.resolve_request(&request.source) else {
            return false;
        };

        debug!(
            "Redirecting load of {} to {}",
            request.source.url(),
            entry.alternate().url()
        );
        request.source = entry.alternate().clone();
        true
    }

    /// Records the locator an asset had before it was moved. The first record wins.
    pub fn remember_original(&self, id: AssetId, original: SourceLocator) {
        self.originals.borrow_mut().entry(id).or_insert(original);
    }

    /// The locator an asset had before it was retargeted.
    pub fn original_source(&self, id: AssetId) -> Option<SourceLocator> {
        self.originals.borrow().get(&id).cloned()
    }

    pub fn is_pinned(&self, id: AssetId) -> bool {
        self.pinned.borrow().contains(&id)
    }

    /// Puts an asset back on its default variant and keeps it there.
    ///
    /// Returns the locator the asset now points at, or `None` if its default locator is
    /// unknown, in which case the asset is left as it is.
    pub fn revert(&self, id: AssetId, asset: &mut AssetDescriptor) -> Option<SourceLocator> {
        self.pinned.borrow_mut().insert(id);

        let current = asset.source()?.clone();
        let target = match self.originals.borrow_mut().remove(&id) {
            Some(original) => original,
            None if self.table.channel_of_alternate(&current).is_none() => current,
            None => {
                warn!(
                    "{} was listed with its compressed variant, there is no default to revert to",
                    asset.name()
                );
                return None;
            }
        };

        info!("Reverting {} to {}", asset.name(), target.url());
        asset.retarget(target.clone());
        Some(target)
    }

    fn matching_entry(&self, id: AssetId, asset: &AssetDescriptor) -> Option<&RemapEntry> {
        if self.is_pinned(id) {
            return None;
        }
        asset
            .source()
            .and_then(|source| self.table.resolve_locator(source))
    }
}

/// Registry hook that remaps assets the moment they are added.
pub struct RemapOnAdd(pub Rc<AssetRemapper>);

impl AddHook for RemapOnAdd {
    fn on_add(&self, id: AssetId, asset: &mut AssetDescriptor) {
        let remapper = &self.0;
        if !asset.is_texture() || asset.source().is_none() {
            return;
        }
        if !remapper.observe_decoder(remapper.decoder_ready()) {
            return;
        }
        remapper.remap_asset(id, asset);
    }
}
