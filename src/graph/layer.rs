// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The power grid as a cached map layer.

use std::collections::BTreeMap;

use crate::cache::{CachedLayer, FeatureCache, Layer, LayerId};
use crate::element::ElementId;
use crate::graph_traits::Geodesic;
use crate::log::LogEntry;
use crate::NetworkGraph;

use super::GridProperties;

impl<G> Layer for NetworkGraph<G>
where
    G: Geodesic,
{
    fn layer_id(&self) -> LayerId {
        LayerId::PowerGrid
    }
}

impl<G> CachedLayer for NetworkGraph<G>
where
    G: Geodesic,
{
    type Properties = GridProperties;

    fn feature_ids(&self) -> Vec<ElementId> {
        self.elements.keys().cloned().collect()
    }

    fn compute_properties(&self, id: &ElementId) -> GridProperties {
        let log = self.validate_element(id).unwrap_or_else(|err| {
            tracing::warn!("Can't validate {id}: {err}");
            vec![]
        });
        GridProperties {
            log,
            ..Default::default()
        }
    }

    fn cache(&self) -> &FeatureCache<GridProperties> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut FeatureCache<GridProperties> {
        &mut self.cache
    }

    fn invalidate_all(&mut self) {
        self.cache.clear();
        self.loss_stale = true;
    }
}

/// Whole-layer cache maintenance.
impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Rebuilds the property bags of every element and propagates losses,
    /// and returns the per-element warnings summary.
    pub fn update_cache(&mut self) -> Vec<LogEntry> {
        let summary = self.update_all().to_vec();
        self.update_calculated_info();
        summary
    }

    /// One summary entry per element with findings, as of the last
    /// [`update_cache`][NetworkGraph::update_cache].
    pub fn warnings_summary(&self) -> &[LogEntry] {
        self.cache.warnings_summary()
    }

    /// The findings of every element that has any, as of the last
    /// [`update_cache`][NetworkGraph::update_cache].
    pub fn warnings(&self) -> &BTreeMap<ElementId, Vec<LogEntry>> {
        self.cache.warnings()
    }
}
