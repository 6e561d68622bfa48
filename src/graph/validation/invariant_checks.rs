// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Helper methods for checking that the links between the cables and PDUs
//! of a [`NetworkGraph`][crate::NetworkGraph] agree with each other.

use crate::element::{Cable, Element, ElementId, Pdu};
use crate::graph_traits::Geodesic;

use super::GridValidator;

impl<G> GridValidator<'_, G>
where
    G: Geodesic,
{
    /// Runs all link checks on every element, and returns the failures.
    pub(super) fn validate_links(&self) -> Vec<String> {
        let mut failures = vec![];
        for element in self.graph.elements() {
            let results = match element {
                Element::Pdu(pdu) => vec![
                    self.ensure_input_feeds_pdu(pdu),
                    self.ensure_outputs_fed_from_pdu(pdu),
                    self.ensure_source_not_fed(pdu),
                ],
                Element::Cable(cable) => vec![
                    self.ensure_listed_in_outputs(cable),
                    self.ensure_is_input(cable),
                ],
            };
            failures.extend(results.into_iter().filter_map(Result::err));
        }
        failures
    }

    fn find_pdu(&self, id: &ElementId) -> Option<&Pdu> {
        self.graph.elements.get(id).and_then(Element::as_pdu)
    }

    fn find_cable(&self, id: &ElementId) -> Option<&Cable> {
        self.graph.elements.get(id).and_then(Element::as_cable)
    }

    /// Checks that the PDU a cable is fed from lists it in its outputs.
    fn ensure_listed_in_outputs(&self, cable: &Cable) -> Result<(), String> {
        let Some(from) = &cable.pdu_from else {
            return Ok(());
        };
        match self.find_pdu(from) {
            None => Err(format!(
                "Cable:{} is fed from {from}, which is not a PDU.",
                cable.id
            )),
            Some(pdu) if !pdu.cables_out.contains(&cable.id) => Err(format!(
                "Cable:{} is fed from PDU:{from}, which doesn't list it in its outputs.",
                cable.id
            )),
            Some(_) => Ok(()),
        }
    }

    /// Checks that the PDU a cable feeds has it as its input.
    fn ensure_is_input(&self, cable: &Cable) -> Result<(), String> {
        let Some(to) = &cable.pdu_to else {
            return Ok(());
        };
        match self.find_pdu(to) {
            None => Err(format!("Cable:{} feeds {to}, which is not a PDU.", cable.id)),
            Some(pdu) if pdu.cable_in.as_ref() != Some(&cable.id) => Err(format!(
                "Cable:{} feeds PDU:{to}, which is not fed from it.",
                cable.id
            )),
            Some(_) => Ok(()),
        }
    }

    /// Checks that the input cable of a PDU feeds it.
    fn ensure_input_feeds_pdu(&self, pdu: &Pdu) -> Result<(), String> {
        let Some(cable_in) = &pdu.cable_in else {
            return Ok(());
        };
        match self.find_cable(cable_in) {
            None => Err(format!(
                "PDU:{} is fed from {cable_in}, which is not a Cable.",
                pdu.id
            )),
            Some(cable) if cable.pdu_to.as_ref() != Some(&pdu.id) => Err(format!(
                "PDU:{} is fed from Cable:{cable_in}, which doesn't feed it.",
                pdu.id
            )),
            Some(_) => Ok(()),
        }
    }

    /// Checks that every output cable of a PDU is fed from it.
    fn ensure_outputs_fed_from_pdu(&self, pdu: &Pdu) -> Result<(), String> {
        for cable_out in &pdu.cables_out {
            match self.find_cable(cable_out) {
                None => {
                    return Err(format!(
                        "PDU:{} lists {cable_out} in its outputs, which is not a Cable.",
                        pdu.id
                    ))
                }
                Some(cable) if cable.pdu_from.as_ref() != Some(&pdu.id) => {
                    return Err(format!(
                        "PDU:{} lists Cable:{cable_out} in its outputs, which is not fed from it.",
                        pdu.id
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Checks that a power source is not also fed from a cable.
    fn ensure_source_not_fed(&self, pdu: &Pdu) -> Result<(), String> {
        match &pdu.cable_in {
            Some(cable_in) if pdu.power_source => Err(format!(
                "PDU:{} is a power source, but is also fed from {cable_in}.",
                pdu.id
            )),
            _ => Ok(()),
        }
    }
}
