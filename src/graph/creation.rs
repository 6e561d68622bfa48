// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for creating [`NetworkGraph`] instances from snapshots.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::cache::{FeatureCache, LayerId};
use crate::element::{Element, ElementId};
use crate::graph_traits::{Geodesic, Haversine};
use crate::log::LogEntry;
use crate::snapshot::Snapshot;
use crate::{Error, GridConfig};

use super::NetworkGraph;

/// The id index of a snapshot, with its log entries partitioned into the
/// per-element ones and the rest.
struct Index {
    elements: BTreeMap<ElementId, Element>,
    snapshot_log: HashMap<ElementId, Vec<LogEntry>>,
    layer_log: Vec<LogEntry>,
}

impl NetworkGraph<Haversine> {
    /// Creates a new [`NetworkGraph`] from the given snapshot, measuring
    /// distances on a spherical earth.
    ///
    /// Returns an error if the snapshot is invalid.
    pub fn try_new(snapshot: Snapshot, config: GridConfig) -> Result<Self, Error> {
        Self::try_with_geodesic(snapshot, config, Haversine)
    }
}

/// `NetworkGraph` instantiation.
impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Creates a new [`NetworkGraph`] from the given snapshot, measuring
    /// distances with `geodesic`.
    ///
    /// Returns an error if the snapshot contains duplicate ids, or cables
    /// with fewer than two points.
    pub fn try_with_geodesic(
        snapshot: Snapshot,
        config: GridConfig,
        geodesic: G,
    ) -> Result<Self, Error> {
        let index = Self::create_index(&snapshot)?;
        Ok(Self {
            elements: index.elements,
            cache: FeatureCache::new(),
            changed: BTreeSet::new(),
            loaded: snapshot,
            snapshot_log: index.snapshot_log,
            layer_log: index.layer_log,
            loss_stale: true,
            config,
            geodesic,
            notifier: None,
        })
    }

    /// Replaces the whole graph with the given snapshot.
    ///
    /// All cached data and tracked changes are dropped.  On error, the graph
    /// is left as it was.
    pub fn reload(&mut self, snapshot: Snapshot) -> Result<(), Error> {
        let index = Self::create_index(&snapshot)?;
        self.elements = index.elements;
        self.snapshot_log = index.snapshot_log;
        self.layer_log = index.layer_log;
        self.loaded = snapshot;
        self.cache = FeatureCache::new();
        self.changed.clear();
        self.loss_stale = true;
        self.notify(LayerId::PowerGrid);
        Ok(())
    }

    /// Discards every change made since the snapshot was loaded, or since
    /// the changes were last taken.
    pub fn reset_changes(&mut self) -> Result<(), Error> {
        self.reload(self.loaded.clone())
    }

    fn create_index(snapshot: &Snapshot) -> Result<Index, Error> {
        let mut elements = BTreeMap::new();
        for element in &snapshot.elements {
            let id = element.id();
            if let Element::Cable(cable) = element {
                if cable.path.len() < 2 {
                    return Err(Error::invalid_snapshot(format!(
                        "Cable {id} must have at least two points."
                    )));
                }
            }
            if elements.insert(id.clone(), element.clone()).is_some() {
                return Err(Error::invalid_snapshot(format!(
                    "Duplicate element ID found: {id}"
                )));
            }
        }
        Self::normalize_backlinks(&mut elements);

        let mut snapshot_log: HashMap<ElementId, Vec<LogEntry>> = HashMap::new();
        let mut layer_log = Vec::new();
        for entry in &snapshot.log {
            match &entry.element_id {
                Some(id) => snapshot_log.entry(id.clone()).or_default().push(entry.clone()),
                None => layer_log.push(entry.clone()),
            }
        }

        tracing::debug!(
            "Loaded {} elements and {} log entries.",
            elements.len(),
            snapshot.log.len()
        );

        Ok(Index {
            elements,
            snapshot_log,
            layer_log,
        })
    }

    /// Removes duplicates from the outputs of every PDU, and makes sure that
    /// every cable is listed in the outputs of the PDU it is fed from.
    fn normalize_backlinks(elements: &mut BTreeMap<ElementId, Element>) {
        for pdu in elements.values_mut().filter_map(Element::as_pdu_mut) {
            let mut seen = HashSet::new();
            pdu.cables_out.retain(|id| seen.insert(id.clone()));
        }

        let feeds = elements
            .values()
            .filter_map(Element::as_cable)
            .filter_map(|c| c.pdu_from.clone().map(|from| (from, c.id.clone())))
            .collect::<Vec<_>>();

        for (from, cable) in feeds {
            match elements.get_mut(&from).and_then(Element::as_pdu_mut) {
                Some(pdu) if !pdu.cables_out.contains(&cable) => {
                    tracing::debug!("Adding cable {cable} to the outputs of PDU {from}.");
                    pdu.cables_out.push(cable);
                }
                Some(_) => {}
                None => {
                    tracing::warn!("Cable {cable} is fed from {from}, which is not a known PDU.")
                }
            }
        }
    }
}
