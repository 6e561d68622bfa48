// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A graph representation of the PDUs and cables of an event's power grid,
//! and the connections between them.

mod creation;
mod layer;
mod loss_propagation;
mod mutations;
mod retrieval;
mod statistics;
mod traversal;
mod validation;

pub mod iterators;

#[cfg(test)]
mod test_utils;

pub use statistics::GridStatistics;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::cache::{CachedProperties, FeatureCache};
use crate::element::{Element, ElementId};
use crate::graph_traits::{DependencyNotifier, Geodesic, Haversine};
use crate::log::LogEntry;
use crate::loss::ElementLoss;
use crate::snapshot::Snapshot;
use crate::GridConfig;

/// The derived data cached for a single grid element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridProperties {
    log: Vec<LogEntry>,
    path_to_source: Option<Vec<ElementId>>,
    loss: Option<ElementLoss>,
}

impl GridProperties {
    /// The resolved path to source, if it was resolved since the bag was
    /// computed.
    pub fn path_to_source(&self) -> Option<&[ElementId]> {
        self.path_to_source.as_deref()
    }

    /// The loss recorded by the last propagation pass, if the element was
    /// reached from a power source.
    pub fn loss(&self) -> Option<&ElementLoss> {
        self.loss.as_ref()
    }
}

impl CachedProperties for GridProperties {
    fn log(&self) -> &[LogEntry] {
        &self.log
    }
}

/// A graph representation of the PDUs and cables of a power grid, and the
/// connections between them.
///
/// Elements are kept in an arena indexed by id, and refer to each other by
/// id only.  Derived data lives in a side-table of [`GridProperties`] that
/// is invalidated explicitly by every mutation.
pub struct NetworkGraph<G = Haversine>
where
    G: Geodesic,
{
    elements: BTreeMap<ElementId, Element>,
    cache: FeatureCache<GridProperties>,
    /// Ids touched since loading.  An id missing from `elements` is a
    /// deletion.
    changed: BTreeSet<ElementId>,
    loaded: Snapshot,
    snapshot_log: HashMap<ElementId, Vec<LogEntry>>,
    layer_log: Vec<LogEntry>,
    loss_stale: bool,
    config: GridConfig,
    geodesic: G,
    notifier: Option<Box<dyn DependencyNotifier>>,
}
