// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for editing the geometry and topology of a [`NetworkGraph`].
//!
//! Every method keeps the links between cables and PDUs symmetric, marks
//! the elements it touches as changed, and notifies the dependent layers.
//! Cached properties are dropped for the downstream end of every changed
//! link and everything below it.  A PDU at the upstream end keeps its own,
//! and so do its other branches.
//!
//! Edits whose preconditions don't hold are rejected with `Ok(false)` and
//! leave the graph untouched.  Errors are returned only for ids that don't
//! name an element of the expected kind.

use crate::cache::LayerId;
use crate::element::{Cable, Element, ElementId, Pdu, Point};
use crate::graph_traits::Geodesic;
use crate::{Error, NetworkGraph};

/// An element whose far end may touch more elements to connect to.
enum Frontier {
    /// A PDU that may feed loose cables ending at its location.
    Pdu(ElementId),
    /// A cable fed from `from`, that may feed a PDU at its other end.
    Cable { id: ElementId, from: ElementId },
}

impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Moves a PDU, dragging along the adjoining ends of its cables.
    ///
    /// Returns the ids of the cables whose geometry changed.
    pub fn move_pdu(&mut self, id: &ElementId, location: Point) -> Result<Vec<ElementId>, Error> {
        let pdu = self.pdu(id)?;
        let ends = pdu
            .cable_in
            .iter()
            .map(|cable| (cable.clone(), false))
            .chain(pdu.cables_out.iter().map(|cable| (cable.clone(), true)))
            .collect::<Vec<_>>();

        self.pdu_mut(id)?.location = location;

        let mut affected = vec![];
        for (cable_id, starts_here) in ends {
            let Some(cable) = self.elements.get_mut(&cable_id).and_then(Element::as_cable_mut)
            else {
                tracing::warn!("PDU {id} refers to missing cable {cable_id}.");
                continue;
            };
            let end = if starts_here {
                cable.path.first_mut()
            } else {
                cable.path.last_mut()
            };
            if let Some(end) = end {
                *end = location;
            }
            cable.length_m = None;
            affected.push(cable_id);
        }

        self.touch(id);
        for cable in &affected {
            self.touch(cable);
        }
        self.notify(LayerId::PowerGrid);
        Ok(affected)
    }

    /// Replaces the path of a cable.  The stored length of the cable is
    /// dropped, so that it is measured from the new path.
    ///
    /// Paths with fewer than two points are rejected.
    pub fn change_cable_path(&mut self, id: &ElementId, path: Vec<Point>) -> Result<bool, Error> {
        self.cable(id)?;
        if path.len() < 2 {
            tracing::warn!("Cable {id} needs at least two points, got {}.", path.len());
            return Ok(false);
        }
        let cable = self.cable_mut(id)?;
        cable.path = path;
        cable.length_m = None;

        self.touch(id);
        self.notify(LayerId::PowerGrid);
        Ok(true)
    }

    /// Connects a cable to a PDU, in whichever direction the current state
    /// of the cable allows.
    ///
    /// A cable that is fed already is connected to the input of the PDU, if
    /// the PDU is unfed, not a power source, and not larger than the cable.
    /// A cable that isn't fed is connected to the output of the PDU, if the
    /// PDU has a path to source.
    ///
    /// After connecting, the connection continues through every loose
    /// element whose end lies on the far end of the newly connected ones.
    ///
    /// Returns `Ok(false)` if the connection was rejected.
    pub fn connect_cable_to_pdu(
        &mut self,
        cable_id: &ElementId,
        pdu_id: &ElementId,
    ) -> Result<bool, Error> {
        let cable = self.cable(cable_id)?.clone();
        let pdu = self.pdu(pdu_id)?.clone();

        if cable.pdu_from.as_ref() == Some(pdu_id) || cable.pdu_to.as_ref() == Some(pdu_id) {
            tracing::debug!("Cable {cable_id} is already connected to PDU {pdu_id}.");
            return Ok(true);
        }

        let frontier = if let Some(from) = &cable.pdu_from {
            if let Some(to) = &cable.pdu_to {
                tracing::warn!(
                    "Can't connect cable {cable_id} to PDU {pdu_id}: \
                     the cable already connects {from} to {to}."
                );
                return Ok(false);
            }
            if let Some(reason) = self.feed_rejection(&cable, &pdu) {
                tracing::warn!("Can't connect cable {cable_id} to PDU {pdu_id}: {reason}.");
                return Ok(false);
            }
            self.link_downstream(cable_id, pdu_id)?;
            Frontier::Pdu(pdu_id.clone())
        } else {
            if !self.has_path_to_source(pdu_id) {
                tracing::warn!(
                    "Can't connect cable {cable_id} to PDU {pdu_id}: \
                     neither of them has a path to source."
                );
                return Ok(false);
            }
            self.link_upstream(pdu_id, cable_id)?;
            Frontier::Cable {
                id: cable_id.clone(),
                from: pdu_id.clone(),
            }
        };

        self.touch(cable_id);
        match frontier {
            Frontier::Pdu(_) => self.touch(pdu_id),
            Frontier::Cable { .. } => self.touch_upstream(pdu_id),
        }
        self.auto_connect(frontier)?;
        self.notify(LayerId::PowerGrid);
        Ok(true)
    }

    /// Disconnects a cable from a PDU at either end.
    ///
    /// Returns `Ok(false)` if the two are not connected.
    pub fn disconnect_cable_from_pdu(
        &mut self,
        cable_id: &ElementId,
        pdu_id: &ElementId,
    ) -> Result<bool, Error> {
        let cable = self.cable(cable_id)?;
        self.pdu(pdu_id)?;
        let upstream = cable.pdu_from.as_ref() == Some(pdu_id);
        let downstream = cable.pdu_to.as_ref() == Some(pdu_id);
        if !upstream && !downstream {
            tracing::warn!("Cable {cable_id} is not connected to PDU {pdu_id}.");
            return Ok(false);
        }

        self.invalidate_downstream(cable_id);
        if upstream {
            self.unlink_upstream(pdu_id, cable_id);
        } else {
            self.unlink_downstream(cable_id, pdu_id);
        }

        self.touch(cable_id);
        if upstream {
            self.touch_upstream(pdu_id);
        } else {
            self.touch(pdu_id);
        }
        self.notify(LayerId::PowerGrid);
        Ok(true)
    }

    /// Deletes an element, disconnecting it from its neighbors first.
    ///
    /// The deletion is recorded in the changes as a `None` entry.
    pub fn delete_feature(&mut self, id: &ElementId) -> Result<(), Error> {
        let element = self.element(id)?.clone();
        self.invalidate_downstream(id);

        let neighbors = match &element {
            Element::Pdu(pdu) => {
                if let Some(cable) = &pdu.cable_in {
                    self.unlink_downstream(cable, id);
                }
                for cable in &pdu.cables_out {
                    self.unlink_upstream(id, cable);
                }
                pdu.cable_in.iter().chain(&pdu.cables_out).cloned().collect::<Vec<_>>()
            }
            Element::Cable(cable) => {
                if let Some(pdu) = &cable.pdu_from {
                    self.unlink_upstream(pdu, id);
                }
                if let Some(pdu) = &cable.pdu_to {
                    self.unlink_downstream(id, pdu);
                }
                cable.pdu_from.iter().chain(&cable.pdu_to).cloned().collect::<Vec<_>>()
            }
        };
        for neighbor in &neighbors {
            if element.upstream_id() == Some(neighbor) {
                self.touch_upstream(neighbor);
            } else if self.elements.contains_key(neighbor) {
                self.touch(neighbor);
            }
        }

        self.elements.remove(id);
        self.cache.invalidate(id);
        self.snapshot_log.remove(id);
        self.mark_changed(id);
        self.loss_stale = true;

        tracing::debug!("Deleted {} {id}.", element.kind());
        self.notify(LayerId::PowerGrid);
        Ok(())
    }

    /// Returns the reason why `cable` can't feed `pdu`, if there is one.
    fn feed_rejection(&self, cable: &Cable, pdu: &Pdu) -> Option<String> {
        if pdu.power_source {
            return Some(format!(
                "PDU {} is a power source, and can't also be fed from elsewhere",
                pdu.id
            ));
        }
        if let Some(cable_in) = &pdu.cable_in {
            return Some(format!("PDU {} is already fed from {cable_in}", pdu.id));
        }
        if !cable.power_size.is_at_least(&pdu.power_size) {
            return Some(format!(
                "a cable of size {} can't feed a PDU of size {}",
                cable.power_size, pdu.power_size
            ));
        }
        if self.walk_upstream(&cable.id).path.contains(&pdu.id) {
            return Some(format!("PDU {} feeds the cable already", pdu.id));
        }
        None
    }

    /// Keeps connecting loose elements that touch the far ends of the
    /// elements connected last.
    fn auto_connect(&mut self, start: Frontier) -> Result<(), Error> {
        let mut frontier = vec![start];
        while let Some(next) = frontier.pop() {
            match next {
                Frontier::Pdu(pdu_id) => {
                    let location = self.pdu(&pdu_id)?.location;
                    let loose = self
                        .cables()
                        .filter(|c| c.pdu_from.is_none() && c.pdu_to.as_ref() != Some(&pdu_id))
                        .filter(|c| {
                            [c.start(), c.end()]
                                .iter()
                                .flatten()
                                .any(|end| self.is_same_point(end, &location))
                        })
                        .map(|c| c.id.clone())
                        .collect::<Vec<_>>();
                    for cable_id in loose {
                        self.link_upstream(&pdu_id, &cable_id)?;
                        self.touch(&cable_id);
                        self.touch_upstream(&pdu_id);
                        frontier.push(Frontier::Cable {
                            id: cable_id,
                            from: pdu_id.clone(),
                        });
                    }
                }
                Frontier::Cable { id, from } => {
                    let cable = self.cable(&id)?;
                    if cable.pdu_to.is_some() {
                        continue;
                    }
                    let origin = self.pdu(&from)?.location;
                    let (Some(start), Some(end)) = (cable.start(), cable.end()) else {
                        continue;
                    };
                    let far_end = if self.is_same_point(&start, &origin) {
                        end
                    } else {
                        start
                    };
                    let target = self
                        .pdus()
                        .find(|p| {
                            p.id != from
                                && self.is_same_point(&p.location, &far_end)
                                && self.feed_rejection(cable, p).is_none()
                        })
                        .map(|p| p.id.clone());
                    if let Some(pdu_id) = target {
                        self.link_downstream(&id, &pdu_id)?;
                        self.touch(&id);
                        self.mark_changed(&pdu_id);
                        frontier.push(Frontier::Pdu(pdu_id));
                    }
                }
            }
        }
        Ok(())
    }

    fn link_upstream(&mut self, pdu_id: &ElementId, cable_id: &ElementId) -> Result<(), Error> {
        self.cable_mut(cable_id)?.pdu_from = Some(pdu_id.clone());
        let pdu = self.pdu_mut(pdu_id)?;
        if !pdu.cables_out.contains(cable_id) {
            pdu.cables_out.push(cable_id.clone());
        }
        tracing::debug!("Connected PDU {pdu_id} => cable {cable_id}.");
        Ok(())
    }

    fn link_downstream(&mut self, cable_id: &ElementId, pdu_id: &ElementId) -> Result<(), Error> {
        self.cable_mut(cable_id)?.pdu_to = Some(pdu_id.clone());
        self.pdu_mut(pdu_id)?.cable_in = Some(cable_id.clone());
        tracing::debug!("Connected cable {cable_id} => PDU {pdu_id}.");
        Ok(())
    }

    /// Removes the link from `pdu_id` into `cable_id`, on whichever of the
    /// two sides it is present.
    fn unlink_upstream(&mut self, pdu_id: &ElementId, cable_id: &ElementId) {
        if let Some(cable) = self.elements.get_mut(cable_id).and_then(Element::as_cable_mut) {
            if cable.pdu_from.as_ref() == Some(pdu_id) {
                cable.pdu_from = None;
            }
        }
        if let Some(pdu) = self.elements.get_mut(pdu_id).and_then(Element::as_pdu_mut) {
            pdu.cables_out.retain(|id| id != cable_id);
        }
        tracing::debug!("Disconnected cable {cable_id} from upstream PDU {pdu_id}.");
    }

    /// Removes the link from `cable_id` into `pdu_id`, on whichever of the
    /// two sides it is present.
    fn unlink_downstream(&mut self, cable_id: &ElementId, pdu_id: &ElementId) {
        if let Some(cable) = self.elements.get_mut(cable_id).and_then(Element::as_cable_mut) {
            if cable.pdu_to.as_ref() == Some(pdu_id) {
                cable.pdu_to = None;
            }
        }
        if let Some(pdu) = self.elements.get_mut(pdu_id).and_then(Element::as_pdu_mut) {
            if pdu.cable_in.as_ref() == Some(cable_id) {
                pdu.cable_in = None;
            }
        }
        tracing::debug!("Disconnected cable {cable_id} from downstream PDU {pdu_id}.");
    }

    /// Marks an element as changed, and drops the cached properties of it
    /// and of everything downstream.
    fn touch(&mut self, id: &ElementId) {
        self.invalidate_downstream(id);
        self.mark_changed(id);
    }

    /// Marks the upstream end of a changed link as changed.
    ///
    /// A PDU keeps its cached properties and those of its other branches.
    /// Anything else is touched like a downstream end.
    fn touch_upstream(&mut self, id: &ElementId) {
        match self.elements.get(id) {
            Some(Element::Pdu(_)) => {
                self.mark_changed(id);
                self.loss_stale = true;
            }
            Some(Element::Cable(_)) => self.touch(id),
            None => {}
        }
    }

    pub(super) fn notify(&mut self, layer: LayerId) {
        if let Some(notifier) = self.notifier.as_mut() {
            notifier.notify_dependents(layer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_layers::TestLayer;
    use crate::cache::LayerRegistry;
    use crate::graph::test_utils::GridBuilder;
    use crate::log::{LogEntry, Severity};
    use crate::size_catalog::PowerSize;

    #[test]
    fn test_move_pdu() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let b = builder.pdu(PowerSize::ThreePhase16);
        let c = builder.pdu(PowerSize::ThreePhase16);
        let cable_a = builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        let cable_b = builder.connect(&a, PowerSize::ThreePhase16, 10.0, &b);
        let cable_c = builder.connect(&a, PowerSize::ThreePhase16, 10.0, &c);
        let mut graph = builder.build(None)?;

        let location = Point::new(0.5, 0.5);
        let affected = graph.move_pdu(a.id(), location)?;
        assert_eq!(
            affected,
            vec![cable_a.id().clone(), cable_b.id().clone(), cable_c.id().clone()]
        );
        assert_eq!(graph.pdu(a.id())?.location, location);
        assert_eq!(graph.cable(cable_a.id())?.end(), Some(location));
        assert_eq!(graph.cable(cable_b.id())?.start(), Some(location));
        assert_eq!(graph.cable(cable_c.id())?.start(), Some(location));

        // The far ends stay where they were, and lengths are measured again.
        assert_eq!(graph.cable(cable_a.id())?.start(), Some(builder.location(&source)));
        assert_eq!(graph.cable(cable_b.id())?.length_m, None);
        assert!(graph.cable_length_m(graph.cable(cable_b.id())?) > 10_000.0);

        let changes = graph.changes();
        assert_eq!(changes.len(), 4);
        assert_eq!(changes[a.id()].as_ref(), Some(graph.element(a.id())?));

        assert!(graph.move_pdu(cable_a.id(), location).is_err());
        Ok(())
    }

    #[test]
    fn test_change_cable_path() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let cable = builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        let mut graph = builder.build(None)?;

        assert!(!graph.change_cable_path(cable.id(), vec![Point::new(0.0, 0.0)])?);
        assert_eq!(graph.cable(cable.id())?.length_m, Some(10.0));
        assert!(graph.changes().is_empty());

        let path = vec![
            builder.location(&source),
            Point::new(0.005, 0.005),
            builder.location(&a),
        ];
        assert!(graph.change_cable_path(cable.id(), path.clone())?);
        assert_eq!(graph.cable(cable.id())?.path, path);
        assert_eq!(graph.cable(cable.id())?.length_m, None);
        assert!(graph.changes().contains_key(cable.id()));
        Ok(())
    }

    #[test]
    fn test_delete_mid_chain_pdu() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let mid = builder.pdu(PowerSize::ThreePhase32);
        let x = builder.pdu(PowerSize::ThreePhase16);
        let y = builder.pdu(PowerSize::ThreePhase16);
        let feed = builder.connect(&source, PowerSize::ThreePhase32, 10.0, &mid);
        let out_x = builder.connect(&mid, PowerSize::ThreePhase16, 10.0, &x);
        let out_y = builder.connect(&mid, PowerSize::ThreePhase16, 10.0, &y);
        let mut graph = builder.build(None)?;

        assert!(graph.path_to_source_ids(out_x.id())?.is_some());
        graph.delete_feature(mid.id())?;

        assert!(!graph.contains(mid.id()));
        assert_eq!(graph.cable(feed.id())?.pdu_to, None);
        assert_eq!(graph.cable(out_x.id())?.pdu_from, None);
        assert_eq!(graph.cable(out_y.id())?.pdu_from, None);
        assert_eq!(graph.path_to_source_ids(out_x.id())?, None);
        assert_eq!(graph.path_to_source_ids(out_y.id())?, None);
        assert_eq!(graph.path_to_source_ids(x.id())?, None);

        let changes = graph.changes();
        assert_eq!(changes.get(mid.id()), Some(&None));
        assert!(changes[feed.id()].is_some());
        assert!(changes[out_x.id()].is_some());
        assert!(graph.check_integrity().is_ok());

        assert!(graph
            .delete_feature(mid.id())
            .is_err_and(|e| e == Error::element_not_found(format!(
                "Element with id {} not found.",
                mid.id()
            ))));
        Ok(())
    }

    #[test]
    fn test_delete_cable() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let cable = builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        let mut graph = builder.build(None)?;

        graph.delete_feature(cable.id())?;
        assert!(graph.pdu(source.id())?.cables_out.is_empty());
        assert_eq!(graph.pdu(a.id())?.cable_in, None);
        assert_eq!(graph.changes().get(cable.id()), Some(&None));
        assert!(graph
            .log(a.id())?
            .contains(&LogEntry::error(a.id(), "PDU is not getting power")));
        Ok(())
    }

    #[test]
    fn test_connect_rejects_smaller_cable() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let pdu = builder.pdu(PowerSize::ThreePhase32);
        let cable = builder.loose_cable(
            PowerSize::ThreePhase16,
            builder.location(&source),
            builder.location(&pdu),
        );
        let mut graph = builder.build(None)?;

        // The far end touches the PDU, but the cable is too small to feed it.
        assert!(graph.connect_cable_to_pdu(cable.id(), source.id())?);
        assert_eq!(graph.cable(cable.id())?.pdu_to, None);

        let before = (graph.cable(cable.id())?.clone(), graph.pdu(pdu.id())?.clone());
        assert!(!graph.connect_cable_to_pdu(cable.id(), pdu.id())?);
        assert_eq!(graph.cable(cable.id())?, &before.0);
        assert_eq!(graph.pdu(pdu.id())?, &before.1);
        Ok(())
    }

    #[test]
    fn test_connect_rejections() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let other_source = builder.source(PowerSize::ThreePhase63);
        let fed = builder.pdu(PowerSize::ThreePhase32);
        let fed_too = builder.pdu(PowerSize::ThreePhase32);
        let orphan = builder.pdu(PowerSize::ThreePhase32);
        let feed = builder.connect(&source, PowerSize::ThreePhase32, 10.0, &fed);
        builder.connect(&source, PowerSize::ThreePhase32, 10.0, &fed_too);
        let free = builder.loose_cable(
            PowerSize::ThreePhase32,
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.01),
        );
        let mut graph = builder.build(None)?;

        // The cable is connected at both ends already.
        assert!(!graph.connect_cable_to_pdu(feed.id(), orphan.id())?);
        // Neither the cable nor the PDU has a path to source.
        assert!(!graph.connect_cable_to_pdu(free.id(), orphan.id())?);

        assert!(graph.connect_cable_to_pdu(free.id(), fed.id())?);
        assert_eq!(graph.cable(free.id())?.pdu_from.as_ref(), Some(fed.id()));

        // The PDU is fed already, or is a power source.
        assert!(!graph.connect_cable_to_pdu(free.id(), fed_too.id())?);
        assert!(!graph.connect_cable_to_pdu(free.id(), other_source.id())?);
        assert!(graph.pdu(other_source.id())?.cable_in.is_none());

        assert!(graph.connect_cable_to_pdu(free.id(), orphan.id())?);
        assert_eq!(graph.pdu(orphan.id())?.cable_in.as_ref(), Some(free.id()));

        assert!(graph.connect_cable_to_pdu(&"nope".into(), orphan.id()).is_err());
        assert!(graph.connect_cable_to_pdu(fed.id(), orphan.id()).is_err());
        assert!(graph.check_integrity().is_ok());
        Ok(())
    }

    #[test]
    fn test_connect_is_idempotent() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let pdu = builder.pdu(PowerSize::ThreePhase32);
        let cable = builder.loose_cable(
            PowerSize::ThreePhase32,
            builder.location(&source),
            Point::new(0.5, 0.5),
        );
        let mut graph = builder.build(None)?;

        assert!(graph.connect_cable_to_pdu(cable.id(), source.id())?);
        let state = graph.elements().cloned().collect::<Vec<_>>();
        let changes = graph.take_changes();
        assert_eq!(changes.len(), 2);

        assert!(graph.connect_cable_to_pdu(cable.id(), source.id())?);
        assert!(graph.elements().cloned().eq(state));
        assert!(graph.changes().is_empty());
        assert_eq!(graph.pdu(source.id())?.cables_out, vec![cable.id().clone()]);
        assert!(graph.pdu(pdu.id())?.cable_in.is_none());
        Ok(())
    }

    #[test]
    fn test_auto_connect() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let b = builder.pdu(PowerSize::ThreePhase16);
        let c = builder.pdu(PowerSize::ThreePhase16);
        let first = builder.loose_cable(
            PowerSize::ThreePhase32,
            builder.location(&source),
            builder.location(&a),
        );
        // Drawn against the direction of flow.
        let second = builder.loose_cable(
            PowerSize::ThreePhase16,
            builder.location(&b),
            builder.location(&a),
        );
        let third = builder.loose_cable(
            PowerSize::ThreePhase16,
            builder.location(&a),
            builder.location(&c),
        );
        let elsewhere = builder.loose_cable(
            PowerSize::ThreePhase16,
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.01),
        );
        let mut graph = builder.build(None)?;

        assert!(graph.connect_cable_to_pdu(first.id(), source.id())?);

        assert_eq!(graph.cable(first.id())?.pdu_to.as_ref(), Some(a.id()));
        assert_eq!(graph.cable(second.id())?.pdu_from.as_ref(), Some(a.id()));
        assert_eq!(graph.cable(second.id())?.pdu_to.as_ref(), Some(b.id()));
        assert_eq!(graph.cable(third.id())?.pdu_to.as_ref(), Some(c.id()));
        assert_eq!(graph.cable(elsewhere.id())?.pdu_from, None);
        assert_eq!(
            graph.path_to_source_ids(b.id())?.map(|p| p.len()),
            Some(5)
        );
        assert!(graph.check_integrity().is_ok());
        assert_eq!(graph.changes().len(), 7);
        Ok(())
    }

    #[test]
    fn test_auto_connect_unpowered_island() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let x = builder.pdu(PowerSize::ThreePhase32);
        let a = builder.pdu(PowerSize::ThreePhase16);
        let b = builder.pdu(PowerSize::ThreePhase16);
        let first = builder.cable_from(&x, PowerSize::ThreePhase32, builder.location(&a));
        let second = builder.loose_cable(
            PowerSize::ThreePhase16,
            builder.location(&a),
            builder.location(&b),
        );
        let mut graph = builder.build(None)?;

        assert!(graph.connect_cable_to_pdu(first.id(), a.id())?);

        assert_eq!(graph.cable(first.id())?.pdu_to.as_ref(), Some(a.id()));
        assert_eq!(graph.cable(second.id())?.pdu_from.as_ref(), Some(a.id()));
        assert_eq!(graph.cable(second.id())?.pdu_to.as_ref(), Some(b.id()));
        assert_eq!(graph.pdu(b.id())?.cable_in.as_ref(), Some(second.id()));
        assert!(!graph.has_path_to_source(b.id()));
        assert!(graph.check_integrity().is_ok());
        Ok(())
    }

    #[test]
    fn test_sibling_branches_keep_cache() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let b = builder.pdu(PowerSize::ThreePhase16);
        let c = builder.pdu(PowerSize::ThreePhase16);
        builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        let to_b = builder.connect(&a, PowerSize::ThreePhase16, 10.0, &b);
        let to_c = builder.connect(&a, PowerSize::ThreePhase16, 10.0, &c);
        let mut graph = builder.build(None)?;

        let cached_path = |graph: &NetworkGraph, id: &ElementId| {
            graph
                .cache
                .get(id)
                .and_then(|p| p.path_to_source().map(<[ElementId]>::to_vec))
        };
        let path_b = graph.path_to_source_ids(b.id())?;
        assert!(path_b.is_some());
        assert!(graph.path_to_source_ids(c.id())?.is_some());

        assert!(graph.disconnect_cable_from_pdu(to_c.id(), a.id())?);
        assert_eq!(cached_path(&graph, b.id()), path_b);
        assert_eq!(cached_path(&graph, c.id()), None);
        assert_eq!(graph.path_to_source_ids(c.id())?, None);
        assert!(graph.changes().contains_key(a.id()));

        assert!(graph.connect_cable_to_pdu(to_c.id(), a.id())?);
        assert_eq!(cached_path(&graph, b.id()), path_b);
        assert!(graph.path_to_source_ids(c.id())?.is_some());

        graph.delete_feature(to_c.id())?;
        assert_eq!(cached_path(&graph, b.id()), path_b);
        assert_eq!(graph.path_to_source_ids(c.id())?, None);
        assert_eq!(graph.pdu(a.id())?.cables_out, vec![to_b.id().clone()]);
        Ok(())
    }

    #[test]
    fn test_disconnect() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let b = builder.pdu(PowerSize::ThreePhase16);
        let cable_a = builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        let cable_b = builder.connect(&a, PowerSize::ThreePhase16, 10.0, &b);
        let mut graph = builder.build(None)?;

        assert!(!graph.disconnect_cable_from_pdu(cable_b.id(), source.id())?);

        assert!(graph.disconnect_cable_from_pdu(cable_b.id(), b.id())?);
        assert_eq!(graph.cable(cable_b.id())?.pdu_to, None);
        assert_eq!(graph.pdu(b.id())?.cable_in, None);
        assert!(graph.path_to_source_ids(cable_b.id())?.is_some());

        assert!(graph.disconnect_cable_from_pdu(cable_a.id(), source.id())?);
        assert!(graph.pdu(source.id())?.cables_out.is_empty());
        assert_eq!(graph.path_to_source_ids(a.id())?, None);
        assert!(graph.check_integrity().is_ok());
        Ok(())
    }

    #[test]
    fn test_no_stale_reads() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let b = builder.pdu(PowerSize::ThreePhase16);
        let cable_a = builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        builder.connect(&a, PowerSize::ThreePhase16, 10.0, &b);
        let mut graph = builder.build(None)?;
        graph.update_cache();

        assert!(graph.log(b.id())?.is_empty());
        assert!(graph.path_to_source_ids(b.id())?.is_some());
        assert!(graph.element_loss(b.id())?.is_some());

        graph.disconnect_cable_from_pdu(cable_a.id(), source.id())?;

        assert_eq!(graph.path_to_source_ids(b.id())?, None);
        assert_eq!(graph.element_loss(b.id())?, None);
        assert_eq!(graph.element_loss(cable_a.id())?, None);
        assert_eq!(
            graph.log(b.id())?,
            &[LogEntry::new(Some(b.id().clone()), Severity::Warning, "No path to source")]
        );

        graph.connect_cable_to_pdu(cable_a.id(), source.id())?;
        assert!(graph.log(b.id())?.is_empty());
        assert!(graph.path_to_source_ids(b.id())?.is_some());
        assert!(graph.element_loss(b.id())?.is_some());
        Ok(())
    }

    #[test]
    fn test_notify_dependents() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let cable = builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        let mut graph = builder.build(None)?;

        let placement = TestLayer::new(LayerId::Placement, vec![LayerId::PowerGrid], &["p"]);
        let triggers = placement.triggers.clone();
        let mut registry = LayerRegistry::new();
        registry.register(Box::new(placement));
        graph.set_notifier(Box::new(registry));

        graph.move_pdu(a.id(), Point::new(0.2, 0.0))?;
        assert_eq!(triggers.get(), 1);
        assert!(!graph.disconnect_cable_from_pdu(cable.id(), &"pdu-x".into()).unwrap_or(false));
        assert_eq!(triggers.get(), 1);
        graph.delete_feature(cable.id())?;
        assert_eq!(triggers.get(), 2);
        Ok(())
    }
}
