// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over the elements of a `NetworkGraph`.

use std::collections::btree_map;

use crate::element::{Cable, Element, ElementId, Pdu};

/// An iterator over the elements in a `NetworkGraph`.
pub struct Elements<'a> {
    pub(crate) iter: btree_map::Values<'a, ElementId, Element>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator over the PDUs in a `NetworkGraph`.
pub struct Pdus<'a> {
    pub(crate) iter: btree_map::Values<'a, ElementId, Element>,
}

impl<'a> Iterator for Pdus<'a> {
    type Item = &'a Pdu;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.by_ref().find_map(Element::as_pdu)
    }
}

/// An iterator over the cables in a `NetworkGraph`.
pub struct Cables<'a> {
    pub(crate) iter: btree_map::Values<'a, ElementId, Element>,
}

impl<'a> Iterator for Cables<'a> {
    type Item = &'a Cable;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.by_ref().find_map(Element::as_cable)
    }
}
