// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains the
//! `GridBuilder`, which can declaratively build power grid snapshots for use
//! in the tests of the `graph` module.

use crate::element::{Cable, Element, ElementId, Pdu, Point};
use crate::size_catalog::PowerSize;
use crate::snapshot::Snapshot;
use crate::{Error, GridConfig, NetworkGraph};

/// Represents an element added to the `GridBuilder`.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct ElementHandle(ElementId);

impl ElementHandle {
    /// Returns the id of the element.
    pub(super) fn id(&self) -> &ElementId {
        &self.0
    }
}

/// A builder for creating power grid snapshots easily, for use in tests.
///
/// PDUs added without an explicit location are placed on the equator, one
/// hundredth of a degree apart.
pub(super) struct GridBuilder {
    elements: Vec<Element>,
    next_id: usize,
    next_slot: usize,
}

impl GridBuilder {
    /// Creates a new `GridBuilder`.
    pub(super) fn new() -> Self {
        GridBuilder {
            elements: Vec::new(),
            next_id: 0,
            next_slot: 0,
        }
    }

    fn next_id(&mut self, prefix: &str) -> ElementId {
        let id = ElementId::new(format!("{prefix}-{}", self.next_id));
        self.next_id += 1;
        id
    }

    fn next_location(&mut self) -> Point {
        let location = Point::new(self.next_slot as f64 * 0.01, 0.0);
        self.next_slot += 1;
        location
    }

    fn pdu_mut(&mut self, handle: &ElementHandle) -> Option<&mut Pdu> {
        self.elements
            .iter_mut()
            .filter_map(Element::as_pdu_mut)
            .find(|p| &p.id == handle.id())
    }

    /// Returns the location of a PDU added to the builder.
    pub(super) fn location(&self, handle: &ElementHandle) -> Point {
        self.elements
            .iter()
            .filter_map(Element::as_pdu)
            .find(|p| &p.id == handle.id())
            .map_or(Point::new(0.0, 0.0), |p| p.location)
    }

    /// Adds a PDU at the given location and returns its handle.
    pub(super) fn pdu_at(&mut self, size: PowerSize, location: Point) -> ElementHandle {
        let id = self.next_id("pdu");
        self.elements.push(Pdu::new(id.clone(), size, location).into());
        ElementHandle(id)
    }

    /// Adds a PDU and returns its handle.
    pub(super) fn pdu(&mut self, size: PowerSize) -> ElementHandle {
        let location = self.next_location();
        self.pdu_at(size, location)
    }

    /// Adds a power source PDU and returns its handle.
    pub(super) fn source(&mut self, size: PowerSize) -> ElementHandle {
        let handle = self.pdu(size);
        if let Some(pdu) = self.pdu_mut(&handle) {
            pdu.power_source = true;
        }
        handle
    }

    /// Adds a cable of the given length from one PDU to another, with a
    /// straight path between their locations, and returns its handle.
    pub(super) fn connect(
        &mut self,
        from: &ElementHandle,
        size: PowerSize,
        length_m: f64,
        to: &ElementHandle,
    ) -> ElementHandle {
        let id = self.next_id("cable");
        let path = vec![self.location(from), self.location(to)];
        let mut cable = Cable::new(id.clone(), size, path).with_length(length_m);
        cable.pdu_from = Some(from.id().clone());
        cable.pdu_to = Some(to.id().clone());
        self.elements.push(cable.into());

        if let Some(pdu) = self.pdu_mut(from) {
            pdu.cables_out.push(id.clone());
        }
        if let Some(pdu) = self.pdu_mut(to) {
            pdu.cable_in = Some(id.clone());
        }
        ElementHandle(id)
    }

    /// Adds a cable fed from `from`, with a straight path from its location
    /// to `end`, and returns its handle.
    pub(super) fn cable_from(
        &mut self,
        from: &ElementHandle,
        size: PowerSize,
        end: Point,
    ) -> ElementHandle {
        let id = self.next_id("cable");
        let mut cable = Cable::new(id.clone(), size, vec![self.location(from), end]);
        cable.pdu_from = Some(from.id().clone());
        self.elements.push(cable.into());
        if let Some(pdu) = self.pdu_mut(from) {
            pdu.cables_out.push(id.clone());
        }
        ElementHandle(id)
    }

    /// Adds an unconnected cable with a straight path from `start` to `end`,
    /// and returns its handle.
    pub(super) fn loose_cable(&mut self, size: PowerSize, start: Point, end: Point) -> ElementHandle {
        let id = self.next_id("cable");
        self.elements
            .push(Cable::new(id.clone(), size, vec![start, end]).into());
        ElementHandle(id)
    }

    /// Returns a snapshot of the elements added to the builder.
    pub(super) fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.elements.clone())
    }

    /// Builds and returns the network graph from the elements added to the
    /// builder.
    pub(super) fn build(&self, config: Option<GridConfig>) -> Result<NetworkGraph, Error> {
        NetworkGraph::try_new(self.snapshot(), config.unwrap_or_default())
    }
}
