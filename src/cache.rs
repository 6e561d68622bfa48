// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Per-feature caches of derived data, shared by every map layer.
//!
//! Each layer keeps a [`FeatureCache`] side-table mapping feature ids to a
//! bag of derived properties.  Bags are computed on first access through the
//! layer's [`compute_properties`][CachedLayer::compute_properties] hook, and
//! are dropped by explicit invalidation only.
//!
//! Layers also declare the layers they depend on.  When a layer changes, a
//! [`LayerRegistry`] routes the notification to every layer that lists it
//! as a dependency, which then rebuilds its own cache.

use std::collections::{BTreeMap, HashMap};

use crate::element::ElementId;
use crate::graph_traits::DependencyNotifier;
use crate::log::{summarize, LogEntry};

/// Identifies a map layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    PowerGrid,
    PowerAreas,
    Placement,
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerId::PowerGrid => write!(f, "power_grid"),
            LayerId::PowerAreas => write!(f, "power_areas"),
            LayerId::Placement => write!(f, "placement"),
        }
    }
}

/// A bag of derived properties of a single feature.
pub trait CachedProperties: Default {
    /// Returns the validation findings for the feature.
    fn log(&self) -> &[LogEntry];
}

/// The side-table of cached property bags of one layer.
#[derive(Debug)]
pub struct FeatureCache<C> {
    entries: HashMap<ElementId, C>,
    ready: bool,
    warnings: BTreeMap<ElementId, Vec<LogEntry>>,
    warnings_summary: Vec<LogEntry>,
}

impl<C> Default for FeatureCache<C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            ready: false,
            warnings: BTreeMap::new(),
            warnings_summary: Vec::new(),
        }
    }
}

impl<C: CachedProperties> FeatureCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ElementId) -> Option<&C> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut C> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn insert(&mut self, id: ElementId, properties: C) {
        self.entries.insert(id, properties);
    }

    /// Returns the bag for `id`, inserting the one made by `make` if there
    /// is none.
    pub fn get_or_insert_with(&mut self, id: ElementId, make: impl FnOnce() -> C) -> &mut C {
        self.entries.entry(id).or_insert_with(make)
    }

    /// Drops the bag of a single feature.
    pub fn invalidate(&mut self, id: &ElementId) {
        self.entries.remove(id);
    }

    /// Drops the bags of all the given features.
    pub fn invalidate_many<'a>(&mut self, ids: impl IntoIterator<Item = &'a ElementId>) {
        for id in ids {
            self.entries.remove(id);
        }
    }

    /// Drops every bag.  The cache is no longer ready until the next full
    /// update.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ready = false;
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut C> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if every feature's bag was computed by the last full
    /// update, and none were dropped since.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub(crate) fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Collects the logs of all bags, and summarizes them per feature.
    ///
    /// Does nothing if the cache is not ready.
    pub fn update_warnings(&mut self) {
        if !self.ready {
            return;
        }
        self.warnings = self
            .entries
            .iter()
            .filter(|(_, props)| !props.log().is_empty())
            .map(|(id, props)| (id.clone(), props.log().to_vec()))
            .collect();
        self.warnings_summary = self
            .warnings
            .iter()
            .filter_map(|(id, log)| summarize(id, log))
            .collect();
        tracing::debug!("{} features with warnings", self.warnings.len());
    }

    /// The non-empty logs of each feature, as of the last full update.
    pub fn warnings(&self) -> &BTreeMap<ElementId, Vec<LogEntry>> {
        &self.warnings
    }

    /// One summary entry per feature with a non-empty log, as of the last
    /// full update.
    pub fn warnings_summary(&self) -> &[LogEntry] {
        &self.warnings_summary
    }
}

/// A map layer that can be notified of changes in the layers it depends on.
pub trait Layer {
    fn layer_id(&self) -> LayerId;

    /// The layers whose changes this layer reacts to.
    fn dependencies(&self) -> &[LayerId] {
        &[]
    }

    /// Called when the layer `from` has changed.
    fn trigger_update_from(&mut self, _from: LayerId) {}
}

/// A layer keeping a cached property bag per feature.
pub trait CachedLayer: Layer {
    type Properties: CachedProperties;

    /// Returns the ids of all features of the layer.
    fn feature_ids(&self) -> Vec<ElementId>;

    /// Computes the property bag of a feature from scratch.
    fn compute_properties(&self, id: &ElementId) -> Self::Properties;

    fn cache(&self) -> &FeatureCache<Self::Properties>;

    fn cache_mut(&mut self) -> &mut FeatureCache<Self::Properties>;

    /// Returns the property bag of a feature, computing it first if it is
    /// not cached.
    fn cached(&mut self, id: &ElementId) -> &mut Self::Properties {
        let computed = (!self.cache().contains(id)).then(|| self.compute_properties(id));
        self.cache_mut()
            .get_or_insert_with(id.clone(), || computed.unwrap_or_default())
    }

    /// Drops the property bags of all features.
    fn invalidate_all(&mut self) {
        self.cache_mut().clear();
    }

    /// Recomputes the property bags of all features, and returns the
    /// resulting warnings summary.
    fn update_all(&mut self) -> &[LogEntry] {
        self.invalidate_all();
        for id in self.feature_ids() {
            let properties = self.compute_properties(&id);
            self.cache_mut().insert(id, properties);
        }
        let cache = self.cache_mut();
        cache.mark_ready();
        cache.update_warnings();
        self.cache().warnings_summary()
    }

    /// Rebuilds the cache if `from` is one of the layer's dependencies.
    ///
    /// Returns true if the cache was rebuilt.
    fn refresh_from(&mut self, from: LayerId) -> bool {
        if !self.dependencies().contains(&from) {
            return false;
        }
        tracing::debug!("{}: updating from {}", self.layer_id(), from);
        self.update_all();
        true
    }
}

/// Routes change notifications between layers.
#[derive(Default)]
pub struct LayerRegistry {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer to the registry.
    pub fn register(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
    }

    /// Returns the registered layer with the given id, if any.
    pub fn layer(&self, id: LayerId) -> Option<&dyn Layer> {
        self.layers
            .iter()
            .find(|l| l.layer_id() == id)
            .map(|l| &**l)
    }

    /// Notifies every layer that depends on `from`, and returns how many
    /// layers were notified.
    pub fn notify_dependents(&mut self, from: LayerId) -> usize {
        let mut notified = 0;
        for layer in self
            .layers
            .iter_mut()
            .filter(|l| l.dependencies().contains(&from))
        {
            layer.trigger_update_from(from);
            notified += 1;
        }
        notified
    }
}

impl DependencyNotifier for LayerRegistry {
    fn notify_dependents(&mut self, layer: LayerId) {
        LayerRegistry::notify_dependents(self, layer);
    }
}
