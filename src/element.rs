// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The network elements: PDUs, the cables between them, and the points they
//! are placed at.

use serde::{Deserialize, Serialize};

use crate::size_catalog::PowerSize;

/// The stable identity of a network element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A geographic point.  Serialized as a `[lon, lat]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Point {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.lon, p.lat]
    }
}

/// A power distribution unit.
///
/// A PDU is fed by at most one cable (`cable_in`) and feeds any number of
/// cables (`cables_out`).  A PDU flagged as `power_source` is a root of the
/// distribution forest and is never fed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pdu {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    pub power_size: PowerSize,
    #[serde(default)]
    pub power_source: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cable_in: Option<ElementId>,
    #[serde(default)]
    pub cables_out: Vec<ElementId>,
    pub location: Point,
}

impl Pdu {
    pub fn new(id: impl Into<ElementId>, power_size: PowerSize, location: Point) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            power_size,
            power_source: false,
            cable_in: None,
            cables_out: Vec::new(),
            location,
        }
    }

    /// Marks the PDU as a power source.
    pub fn with_power_source(mut self) -> Self {
        self.power_source = true;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A cable between two PDUs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cable {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    pub power_size: PowerSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdu_from: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdu_to: Option<ElementId>,
    pub path: Vec<Point>,
    /// Physical length in meters, if known.  Cleared whenever the path
    /// changes, after which the length is measured from the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,
}

impl Cable {
    pub fn new(id: impl Into<ElementId>, power_size: PowerSize, path: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            power_size,
            pdu_from: None,
            pdu_to: None,
            path,
            length_m: None,
        }
    }

    pub fn with_length(mut self, length_m: f64) -> Self {
        self.length_m = Some(length_m);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// First point of the path.
    pub fn start(&self) -> Option<Point> {
        self.path.first().copied()
    }

    /// Last point of the path.
    pub fn end(&self) -> Option<Point> {
        self.path.last().copied()
    }
}

/// A network element: either a PDU or a cable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Element {
    #[serde(rename = "power_grid_pdu")]
    Pdu(Pdu),
    #[serde(rename = "power_grid_cable")]
    Cable(Cable),
}

impl Element {
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Pdu(pdu) => &pdu.id,
            Element::Cable(cable) => &cable.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Element::Pdu(pdu) => &pdu.name,
            Element::Cable(cable) => &cable.name,
        }
    }

    pub fn power_size(&self) -> PowerSize {
        match self {
            Element::Pdu(pdu) => pdu.power_size,
            Element::Cable(cable) => cable.power_size,
        }
    }

    pub fn as_pdu(&self) -> Option<&Pdu> {
        match self {
            Element::Pdu(pdu) => Some(pdu),
            Element::Cable(_) => None,
        }
    }

    pub fn as_cable(&self) -> Option<&Cable> {
        match self {
            Element::Cable(cable) => Some(cable),
            Element::Pdu(_) => None,
        }
    }

    pub(crate) fn as_pdu_mut(&mut self) -> Option<&mut Pdu> {
        match self {
            Element::Pdu(pdu) => Some(pdu),
            Element::Cable(_) => None,
        }
    }

    pub(crate) fn as_cable_mut(&mut self) -> Option<&mut Cable> {
        match self {
            Element::Cable(cable) => Some(cable),
            Element::Pdu(_) => None,
        }
    }

    pub fn is_pdu(&self) -> bool {
        matches!(self, Element::Pdu(_))
    }

    pub fn is_cable(&self) -> bool {
        matches!(self, Element::Cable(_))
    }

    /// Returns true if the element is a PDU flagged as a power source.
    pub fn is_power_source(&self) -> bool {
        matches!(self, Element::Pdu(Pdu { power_source: true, .. }))
    }

    /// Returns the id of the next element towards the power source, if any.
    ///
    /// A power source has no upstream element, even if its `cable_in` is set.
    pub fn upstream_id(&self) -> Option<&ElementId> {
        match self {
            Element::Pdu(pdu) if pdu.power_source => None,
            Element::Pdu(pdu) => pdu.cable_in.as_ref(),
            Element::Cable(cable) => cable.pdu_from.as_ref(),
        }
    }

    /// Returns the kind of the element, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Pdu(_) => "PDU",
            Element::Cable(_) => "Cable",
        }
    }
}

impl From<Pdu> for Element {
    fn from(pdu: Pdu) -> Self {
        Element::Pdu(pdu)
    }
}

impl From<Cable> for Element {
    fn from(cable: Cable) -> Self {
        Element::Cable(cable)
    }
}
