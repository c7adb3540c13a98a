//! The [`AssetRegistry`] keeps every [`AssetDescriptor`] the loader knows about.
//!
//! Loads go through a two step protocol: [`AssetRegistry::begin_load`] hands out a
//! [`LoadTicket`] for the descriptor's current source, and the result is only accepted by
//! [`AssetRegistry::complete_load`] / [`AssetRegistry::fail_load`] if the descriptor was
//! not retargeted in the meantime. A retarget while a fetch is in flight therefore can never
//! mix the old payload into the new source.

use crate::{AssetDescriptor, LoadState, SourceLocator, TextureResource};
use slotmap::{SlotMap, new_key_type};
use tracing::trace;

new_key_type! {
    /// Identifies an asset inside its registry.
    pub struct AssetId;
}

/// Runs on every asset right after it was added to the registry.
pub trait AddHook {
    fn on_add(&self, id: AssetId, asset: &mut AssetDescriptor);
}

/// Proof that a load was dispatched for a specific source of a specific asset.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LoadTicket {
    pub id: AssetId,
    pub generation: u64,
    pub source: SourceLocator,
}

/// What happened to a load result handed back to the registry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// The asset was retargeted or removed while the load was in flight.
    Stale,
}

#[derive(Default)]
pub struct AssetRegistry {
    assets: SlotMap<AssetId, AssetDescriptor>,
    order: Vec<AssetId>,
    hooks: Vec<Box<dyn AddHook>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a hook that sees every asset added from now on.
    pub fn add_hook(&mut self, hook: impl AddHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn add(&mut self, asset: AssetDescriptor) -> AssetId {
        let id = self.assets.insert(asset);
        self.order.push(id);

        let asset = &mut self.assets[id];
        for hook in &self.hooks {
            hook.on_add(id, asset);
        }

        id
    }

    pub fn remove(&mut self, id: AssetId) -> Option<AssetDescriptor> {
        let asset = self.assets.remove(id)?;
        self.order.retain(|other| *other != id);
        Some(asset)
    }

    pub fn get(&self, id: AssetId) -> Option<&AssetDescriptor> {
        self.assets.get(id)
    }

    pub fn get_mut(&mut self, id: AssetId) -> Option<&mut AssetDescriptor> {
        self.assets.get_mut(id)
    }

    pub fn find(&self, name: &str) -> Option<AssetId> {
        self.list()
            .find(|(_, asset)| asset.name() == name)
            .map(|(id, _)| id)
    }

    /// All assets in insertion order.
    pub fn list(&self) -> impl Iterator<Item = (AssetId, &AssetDescriptor)> {
        self.order.iter().map(|id| (*id, &self.assets[*id]))
    }

    /// Snapshot of all ids in insertion order.
    pub fn ids(&self) -> Vec<AssetId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Marks the asset as loading and returns a ticket for its current source.
    ///
    /// Returns `None` for unknown ids, assets without a source and assets whose current
    /// source is already being loaded.
    pub fn begin_load(&mut self, id: AssetId) -> Option<LoadTicket> {
        let asset = self.assets.get_mut(id)?;
        if asset.state() == LoadState::Loading {
            return None;
        }
        let source = asset.source()?.clone();
        asset.mark_loading();

        Some(LoadTicket {
            id,
            generation: asset.generation(),
            source,
        })
    }

    /// Whether a result for this ticket would still be accepted.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.assets.get(ticket.id).is_some_and(|asset| {
            asset.generation() == ticket.generation && asset.source() == Some(&ticket.source)
        })
    }

    /// Stores a successfully decoded resource. `resolved` is the locator the payload was
    /// actually fetched from, which becomes the asset's source.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        resource: TextureResource,
        resolved: SourceLocator,
    ) -> LoadOutcome {
        if !self.is_current(ticket) {
            trace!("Discarding stale load result for {}", ticket.source.url());
            return LoadOutcome::Stale;
        }

        self.assets[ticket.id].mark_loaded(resource, resolved);
        LoadOutcome::Loaded
    }

    /// Records a failed load. `resolved` is the locator the failed request targeted, which
    /// becomes the asset's source just like on success.
    pub fn fail_load(&mut self, ticket: &LoadTicket, resolved: SourceLocator) -> LoadOutcome {
        if !self.is_current(ticket) {
            trace!("Discarding stale load failure for {}", ticket.source.url());
            return LoadOutcome::Stale;
        }

        self.assets[ticket.id].mark_failed(resolved);
        LoadOutcome::Failed
    }
}
