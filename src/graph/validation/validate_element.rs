// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for producing the validation log of a single element.

use crate::element::{Cable, Element, Pdu};
use crate::graph_traits::Geodesic;
use crate::log::LogEntry;

use super::GridValidator;

impl<G> GridValidator<'_, G>
where
    G: Geodesic,
{
    pub(super) fn validate_element(&self, element: &Element) -> Vec<LogEntry> {
        let mut log = vec![];
        if element.power_size().is_unknown() {
            log.push(LogEntry::warning(element.id(), "Unknown power size"));
        }
        match element {
            Element::Pdu(pdu) => self.validate_pdu(pdu, &mut log),
            Element::Cable(cable) => self.validate_cable(cable, &mut log),
        }
        log
    }

    /// Checks that:
    /// - a PDU that is not a power source is fed from a cable.
    /// - a power source is not fed from a cable.
    /// - a fed PDU has a path to a power source.
    fn validate_pdu(&self, pdu: &Pdu, log: &mut Vec<LogEntry>) {
        match (&pdu.cable_in, pdu.power_source) {
            (None, false) => log.push(LogEntry::error(&pdu.id, "PDU is not getting power")),
            (Some(cable_in), true) => log.push(LogEntry::error(
                &pdu.id,
                format!("PDU is a power source, but is also fed from {cable_in}"),
            )),
            (Some(_), false) => {
                if !self.graph.walk_upstream(&pdu.id).reached_source {
                    log.push(LogEntry::warning(&pdu.id, "No path to source"));
                }
            }
            (None, true) => {}
        }
    }

    /// Checks that:
    /// - a cable is fed from a PDU, and feeds a PDU.
    /// - the PDU it feeds is not of a larger size class.
    /// - the PDU it is fed from has a path to a power source.
    fn validate_cable(&self, cable: &Cable, log: &mut Vec<LogEntry>) {
        if cable.pdu_from.is_none() {
            log.push(LogEntry::error(&cable.id, "Cable is not connected to source"));
        } else if !self.graph.walk_upstream(&cable.id).reached_source {
            log.push(LogEntry::warning(&cable.id, "No path to source"));
        }

        let Some(to) = &cable.pdu_to else {
            log.push(LogEntry::error(&cable.id, "Cable is not connected to load"));
            return;
        };
        if let Some(pdu) = self.graph.elements.get(to).and_then(Element::as_pdu) {
            if !cable.power_size.is_at_least(&pdu.power_size) {
                log.push(LogEntry::warning(
                    &cable.id,
                    format!(
                        "Cable of size {} feeds PDU {to} of size {}",
                        cable.power_size, pdu.power_size
                    ),
                ));
            }
        }
    }
}
