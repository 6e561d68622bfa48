// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for validating a [`NetworkGraph`].
//!
//! There are two kinds of validation.  Per-element validation produces the
//! log entries shown next to each element, and never fails: a grid that is
//! still being wired is expected to have unpowered parts.  The integrity
//! check looks for states no edit can produce, like asymmetric links or
//! cycles, and fails with an error listing them.

mod invariant_checks;
mod validate_element;
mod validate_graph;

use crate::element::ElementId;
use crate::graph_traits::Geodesic;
use crate::log::LogEntry;
use crate::{Error, NetworkGraph};

pub(crate) struct GridValidator<'a, G>
where
    G: Geodesic,
{
    graph: &'a NetworkGraph<G>,
}

/// Validation.
impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Returns the validation log of an element, including the entries
    /// loaded with the snapshot for it.
    pub fn validate_element(&self, id: &ElementId) -> Result<Vec<LogEntry>, Error> {
        let element = self.element(id)?;
        let mut log = GridValidator { graph: self }.validate_element(element);
        if let Some(entries) = self.snapshot_log.get(id) {
            log.extend(entries.iter().cloned());
        }
        Ok(log)
    }

    /// Checks that the links between cables and PDUs are symmetric, point
    /// to existing elements, and don't form cycles.
    ///
    /// Returns an error describing every violation found.
    pub fn check_integrity(&self) -> Result<(), Error> {
        let validator = GridValidator { graph: self };
        let mut failures = validator.validate_links();
        if let Err(cycle) = validator.validate_acyclicity() {
            failures.push(cycle);
        }
        if failures.is_empty() {
            return Ok(());
        }
        for failure in &failures {
            tracing::error!("{failure}");
        }
        Err(Error::invalid_graph(failures.join(" ")))
    }
}
