// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for retrieving elements, their derived data, and the tracked
//! changes from a [`NetworkGraph`].

use crate::cache::CachedLayer;
use crate::element::{Cable, Element, ElementId, Pdu, Point};
use crate::graph_traits::{DependencyNotifier, Geodesic};
use crate::iterators::{Cables, Elements, Pdus};
use crate::log::LogEntry;
use crate::snapshot::ChangeSet;
use crate::{Error, GridConfig};

use super::{GridProperties, NetworkGraph};

/// Element retrieval.
impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Returns the element with the given `id`, if it exists.
    pub fn element(&self, id: &ElementId) -> Result<&Element, Error> {
        self.elements
            .get(id)
            .ok_or_else(|| Error::element_not_found(format!("Element with id {id} not found.")))
    }

    /// Returns the PDU with the given `id`.
    ///
    /// Returns an error if there is no such element, or if it is a cable.
    pub fn pdu(&self, id: &ElementId) -> Result<&Pdu, Error> {
        let element = self.element(id)?;
        element.as_pdu().ok_or_else(|| {
            Error::invalid_element(format!("Element {id} is a {}, not a PDU.", element.kind()))
        })
    }

    /// Returns the cable with the given `id`.
    ///
    /// Returns an error if there is no such element, or if it is a PDU.
    pub fn cable(&self, id: &ElementId) -> Result<&Cable, Error> {
        let element = self.element(id)?;
        element.as_cable().ok_or_else(|| {
            Error::invalid_element(format!("Element {id} is a {}, not a Cable.", element.kind()))
        })
    }

    pub(super) fn pdu_mut(&mut self, id: &ElementId) -> Result<&mut Pdu, Error> {
        self.pdu(id)?;
        self.elements
            .get_mut(id)
            .and_then(Element::as_pdu_mut)
            .ok_or_else(|| Error::internal(format!("PDU {id} vanished.")))
    }

    pub(super) fn cable_mut(&mut self, id: &ElementId) -> Result<&mut Cable, Error> {
        self.cable(id)?;
        self.elements
            .get_mut(id)
            .and_then(Element::as_cable_mut)
            .ok_or_else(|| Error::internal(format!("Cable {id} vanished.")))
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns an iterator over all elements, ordered by id.
    pub fn elements(&self) -> Elements {
        Elements {
            iter: self.elements.values(),
        }
    }

    /// Returns an iterator over the PDUs, ordered by id.
    pub fn pdus(&self) -> Pdus {
        Pdus {
            iter: self.elements.values(),
        }
    }

    /// Returns an iterator over the cables, ordered by id.
    pub fn cables(&self) -> Cables {
        Cables {
            iter: self.elements.values(),
        }
    }

    /// Returns the length of a cable in meters.
    ///
    /// This is the length stored with the cable if there is one, and the
    /// length of its path otherwise.
    pub fn cable_length_m(&self, cable: &Cable) -> f64 {
        cable
            .length_m
            .unwrap_or_else(|| self.geodesic.polyline_length_m(&cable.path))
    }

    pub(super) fn is_same_point(&self, a: &Point, b: &Point) -> bool {
        self.geodesic.distance_m(a, b) < self.config.same_point_tolerance_m
    }

    /// Returns the cached properties of an element, computing its
    /// validation log first if needed.
    pub fn properties(&mut self, id: &ElementId) -> Result<&GridProperties, Error> {
        self.element(id)?;
        Ok(self.cached(id))
    }

    /// Returns the validation log of an element.
    pub fn log(&mut self, id: &ElementId) -> Result<&[LogEntry], Error> {
        Ok(&self.properties(id)?.log)
    }

    /// Log entries of the loaded snapshot that don't refer to any element.
    pub fn layer_log(&self) -> &[LogEntry] {
        &self.layer_log
    }

    /// The timestamp of the loaded snapshot.
    pub fn timestamp(&self) -> Option<&str> {
        self.loaded.timestamp.as_deref()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Sets whatever is to be notified after every change to the grid.
    pub fn set_notifier(&mut self, notifier: Box<dyn DependencyNotifier>) {
        self.notifier = Some(notifier);
    }
}

/// Change tracking.
impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Returns the elements changed since loading, with `None` for the
    /// deleted ones.
    pub fn changes(&self) -> ChangeSet {
        self.changed
            .iter()
            .map(|id| (id.clone(), self.elements.get(id).cloned()))
            .collect()
    }

    /// Returns the changes since loading, and makes the current state the
    /// one [`reset_changes`][NetworkGraph::reset_changes] returns to.
    pub fn take_changes(&mut self) -> ChangeSet {
        let changes = self.changes();
        self.changed.clear();
        self.loaded.elements = self.elements.values().cloned().collect();
        self.loaded.log.retain(|entry| {
            entry
                .element_id
                .as_ref()
                .map_or(true, |id| self.elements.contains_key(id))
        });
        changes
    }

    pub(super) fn mark_changed(&mut self, id: &ElementId) {
        self.changed.insert(id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::GridBuilder;
    use crate::size_catalog::PowerSize;

    #[test]
    fn test_element() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let pdu = builder.pdu(PowerSize::ThreePhase32);
        let cable = builder.connect(&source, PowerSize::ThreePhase32, 100.0, &pdu);
        let graph = builder.build(None)?;

        assert!(graph.element(source.id())?.is_power_source());
        assert_eq!(graph.pdu(pdu.id())?.cable_in.as_ref(), Some(cable.id()));
        assert_eq!(graph.cable(cable.id())?.pdu_to.as_ref(), Some(pdu.id()));

        assert_eq!(
            graph.element(&"pdu-9".into()),
            Err(Error::element_not_found("Element with id pdu-9 not found."))
        );
        assert_eq!(
            graph.pdu(cable.id()),
            Err(Error::invalid_element(format!(
                "Element {} is a Cable, not a PDU.",
                cable.id()
            )))
        );
        assert_eq!(
            graph.cable(pdu.id()),
            Err(Error::invalid_element(format!(
                "Element {} is a PDU, not a Cable.",
                pdu.id()
            )))
        );
        Ok(())
    }

    #[test]
    fn test_iterators() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        let b = builder.pdu(PowerSize::ThreePhase16);
        builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        builder.connect(&a, PowerSize::ThreePhase16, 10.0, &b);
        let graph = builder.build(None)?;

        assert_eq!(graph.len(), 5);
        assert_eq!(graph.elements().count(), 5);
        assert_eq!(graph.pdus().count(), 3);
        assert_eq!(graph.cables().count(), 2);
        assert!(graph.pdus().filter(|p| p.power_source).eq([graph.pdu(source.id())?]));
        Ok(())
    }

    #[test]
    fn test_cable_length() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let pdu = builder.pdu(PowerSize::ThreePhase32);
        let cable = builder.connect(&source, PowerSize::ThreePhase32, 42.0, &pdu);
        let loose = builder.loose_cable(
            PowerSize::ThreePhase32,
            Point::new(0.0, 0.0),
            Point::new(0.01, 0.0),
        );
        let graph = builder.build(None)?;

        assert_eq!(graph.cable_length_m(graph.cable(cable.id())?), 42.0);
        let measured = graph.cable_length_m(graph.cable(loose.id())?);
        assert!((measured - 1111.95).abs() < 0.1, "{measured}");
        Ok(())
    }
}
