// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The data exchanged with the persistence layer: the snapshot a graph is
//! loaded from, and the set of changes made to it since.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId};
use crate::log::LogEntry;
use crate::Error;

/// A timestamped revision of the network elements of a project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub elements: Vec<Element>,
    /// Log entries produced by the backend for this revision.
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl Snapshot {
    pub fn new(elements: impl IntoIterator<Item = Element>) -> Self {
        Self {
            timestamp: None,
            elements: elements.into_iter().collect(),
            log: Vec::new(),
        }
    }

    /// Decodes a snapshot from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encodes the snapshot as JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The elements changed since the snapshot was loaded.
///
/// An edited element maps to its current state, a deleted one to `None`.
pub type ChangeSet = BTreeMap<ElementId, Option<Element>>;
