// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains methods that walk the graph upstream towards the
//! power sources, or downstream away from them.

use std::collections::HashSet;

use crate::cache::CachedLayer;
use crate::element::{Element, ElementId};
use crate::graph_traits::Geodesic;
use crate::{Error, NetworkGraph};

/// The elements visited while walking upstream from an element.
pub(super) struct UpstreamWalk {
    /// The visited elements, starting with the one the walk started from.
    pub(super) path: Vec<ElementId>,
    /// Whether the walk ended at a power source.
    pub(super) reached_source: bool,
}

/// Traversal methods.
impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Follows upstream links from `from` until a power source, a missing
    /// link, or an element seen before.
    pub(super) fn walk_upstream(&self, from: &ElementId) -> UpstreamWalk {
        let mut path = vec![];
        let mut visited = HashSet::new();
        let mut current = from;
        loop {
            if !visited.insert(current) {
                tracing::error!(
                    "Cycle detected upstream of {from}: {} -> {current}",
                    path.iter()
                        .map(|id: &ElementId| id.to_string())
                        .collect::<Vec<_>>()
                        .join(" -> "),
                );
                return UpstreamWalk {
                    path,
                    reached_source: false,
                };
            }
            let Some(element) = self.elements.get(current) else {
                tracing::warn!("Element {current} upstream of {from} not found.");
                return UpstreamWalk {
                    path,
                    reached_source: false,
                };
            };
            path.push(current.clone());
            if element.is_power_source() {
                return UpstreamWalk {
                    path,
                    reached_source: true,
                };
            }
            match element.upstream_id() {
                Some(next) => current = next,
                None => {
                    return UpstreamWalk {
                        path,
                        reached_source: false,
                    }
                }
            }
        }
    }

    /// Returns true if the element is a power source, or is fed from one.
    pub fn has_path_to_source(&self, id: &ElementId) -> bool {
        self.walk_upstream(id).reached_source
    }

    /// Returns the ids of the elements from `id` up to and including its
    /// power source, or `None` if the element is not connected to one.
    ///
    /// Resolved paths are cached until an element on the path changes.
    pub fn path_to_source_ids(&mut self, id: &ElementId) -> Result<Option<Vec<ElementId>>, Error> {
        self.element(id)?;
        if let Some(path) = self.cache.get(id).and_then(|p| p.path_to_source.clone()) {
            return Ok(Some(path));
        }
        let walk = self.walk_upstream(id);
        if !walk.reached_source {
            tracing::warn!("No path to source from {id}.");
            return Ok(None);
        }
        self.cached(id).path_to_source = Some(walk.path.clone());
        Ok(Some(walk.path))
    }

    /// Returns the elements from `id` up to and including its power source,
    /// or `None` if the element is not connected to one.
    pub fn path_to_source(&mut self, id: &ElementId) -> Result<Option<Vec<&Element>>, Error> {
        let Some(ids) = self.path_to_source_ids(id)? else {
            return Ok(None);
        };
        ids.iter().map(|id| self.element(id)).collect::<Result<_, _>>().map(Some)
    }

    /// Returns the ids of the elements fed through `id`, children first and
    /// `id` itself last.
    pub fn downstream_ids(&self, id: &ElementId) -> Result<Vec<ElementId>, Error> {
        self.element(id)?;
        let mut visited = HashSet::new();
        let mut order = vec![];
        self.collect_downstream(id, &mut visited, &mut order);
        Ok(order)
    }

    fn collect_downstream<'a>(
        &'a self,
        id: &'a ElementId,
        visited: &mut HashSet<&'a ElementId>,
        order: &mut Vec<ElementId>,
    ) {
        if !visited.insert(id) {
            tracing::error!("Element {id} reached twice while walking downstream.");
            return;
        }
        let Some(element) = self.elements.get(id) else {
            tracing::warn!("Downstream element {id} not found.");
            return;
        };
        match element {
            Element::Pdu(pdu) => {
                for cable in &pdu.cables_out {
                    self.collect_downstream(cable, visited, order);
                }
            }
            Element::Cable(cable) => {
                if let Some(pdu) = &cable.pdu_to {
                    self.collect_downstream(pdu, visited, order);
                }
            }
        }
        order.push(id.clone());
    }

    /// Returns the elements fed through `id`, children first and the
    /// element itself last.
    pub fn downstream(&self, id: &ElementId) -> Result<Vec<&Element>, Error> {
        self.downstream_ids(id)?
            .iter()
            .map(|id| self.element(id))
            .collect()
    }

    /// Calls `visit` on every element fed through `id`, children first and
    /// the element itself last.
    pub fn for_each_downstream(
        &self,
        id: &ElementId,
        mut visit: impl FnMut(&Element),
    ) -> Result<(), Error> {
        for element in self.downstream(id)? {
            visit(element);
        }
        Ok(())
    }

    /// Drops the cached properties of `id` and of everything fed through it,
    /// and marks the losses as stale.
    pub fn invalidate_downstream(&mut self, id: &ElementId) {
        match self.downstream_ids(id) {
            Ok(ids) => self.cache.invalidate_many(&ids),
            Err(_) => self.cache.invalidate(id),
        }
        self.loss_stale = true;
    }
}
