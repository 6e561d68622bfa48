// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for pushing current and voltage downstream from the power
//! sources, and for computing the loss along the path to source.

use std::collections::HashSet;

use crate::cache::CachedLayer;
use crate::element::{Element, ElementId};
use crate::graph_traits::Geodesic;
use crate::loss::{
    flow_split, path_loss, CableLoss, ElementLoss, LossStrategy, PathLoss, PathStep, PduLoss,
};
use crate::size_catalog::PowerSize;
use crate::{Error, NetworkGraph};

/// An outgoing cable of a PDU, as needed for loss propagation.
struct Outgoing {
    id: ElementId,
    size: PowerSize,
    length_m: f64,
    /// The PDU the cable feeds, and that PDU's ampacity.
    feeds: Option<(ElementId, f64)>,
}

/// Loss propagation.
impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Sets the strategy used for loss propagation.  Losses are recomputed
    /// on the next query.
    pub fn set_loss_strategy(&mut self, strategy: LossStrategy) {
        self.config.loss_strategy = strategy;
        self.loss_stale = true;
    }

    /// Recomputes the losses of every element reachable from a power
    /// source, in one full pass from every source.
    ///
    /// Elements that can't be reached from a source are left without loss.
    pub fn update_calculated_info(&mut self) {
        for properties in self.cache.values_mut() {
            properties.loss = None;
        }

        let sources = self
            .pdus()
            .filter(|p| p.power_source)
            .map(|p| (p.id.clone(), p.power_size.info().max_amps))
            .collect::<Vec<_>>();
        let strategy = self.config.loss_strategy;
        let voltage = self.config.reference_voltage;

        let mut visited = HashSet::new();
        for (source, max_amps) in &sources {
            self.update_loss_from_pdu(source, voltage, *max_amps, strategy, &mut visited);
        }
        self.loss_stale = false;

        tracing::debug!(
            "Propagated losses from {} sources over {} elements.",
            sources.len(),
            visited.len()
        );
    }

    /// Records the loss of `pdu_id` fed at `voltage_in` with `current_in`,
    /// and recurses into everything it feeds.
    fn update_loss_from_pdu(
        &mut self,
        pdu_id: &ElementId,
        voltage_in: f64,
        current_in: f64,
        strategy: LossStrategy,
        visited: &mut HashSet<ElementId>,
    ) {
        if !visited.insert(pdu_id.clone()) {
            tracing::error!("PDU {pdu_id} reached twice while propagating losses.");
            return;
        }
        let Ok(pdu) = self.pdu(pdu_id) else {
            tracing::warn!("Can't propagate losses into missing PDU {pdu_id}.");
            return;
        };

        let outgoing = pdu
            .cables_out
            .iter()
            .filter_map(|id| self.elements.get(id).and_then(Element::as_cable))
            .map(|cable| Outgoing {
                id: cable.id.clone(),
                size: cable.power_size,
                length_m: self.cable_length_m(cable),
                feeds: cable
                    .pdu_to
                    .as_ref()
                    .and_then(|id| self.elements.get(id))
                    .and_then(Element::as_pdu)
                    .map(|p| (p.id.clone(), p.power_size.info().max_amps)),
            })
            .collect::<Vec<_>>();

        // For every outgoing cable: the current it carries, and the current
        // entering the PDU it feeds.
        let (allotments, current_load): (Vec<(f64, f64)>, f64) = match strategy {
            LossStrategy::Capacity { load_fraction } => (
                outgoing
                    .iter()
                    .map(|cable| {
                        let current = cable.size.info().max_amps * load_fraction;
                        let fed = cable.feeds.as_ref().map_or(0.0, |(_, max_amps)| *max_amps);
                        (current, fed)
                    })
                    .collect(),
                current_in * load_fraction,
            ),
            LossStrategy::Flow { load_fraction } => {
                let max_amps = outgoing
                    .iter()
                    .map(|cable| cable.size.info().max_amps)
                    .collect::<Vec<_>>();
                let split = flow_split(current_in, load_fraction, &max_amps);
                let current_load = if outgoing.is_empty() {
                    current_in * load_fraction
                } else {
                    current_in
                };
                (split.into_iter().map(|c| (c, c)).collect(), current_load)
            }
        };

        self.cached(pdu_id).loss = Some(ElementLoss::Pdu(PduLoss {
            voltage_in,
            current_in,
            current_load,
        }));

        for (cable, (current, fed_current)) in outgoing.into_iter().zip(allotments) {
            let loss = CableLoss::compute(cable.size, cable.length_m, voltage_in, current);
            self.cached(&cable.id).loss = Some(ElementLoss::Cable(loss));
            if let Some((fed, _)) = cable.feeds {
                self.update_loss_from_pdu(
                    &fed,
                    voltage_in - loss.voltage_drop,
                    fed_current,
                    strategy,
                    visited,
                );
            }
        }
    }

    /// Returns the loss recorded for an element by the last propagation
    /// pass, running a new pass first if anything changed since.
    ///
    /// Returns `None` for elements that can't be reached from a source.
    pub fn element_loss(&mut self, id: &ElementId) -> Result<Option<ElementLoss>, Error> {
        self.element(id)?;
        if self.loss_stale {
            self.update_calculated_info();
        }
        Ok(self.cache.get(id).and_then(|p| p.loss))
    }

    /// Returns the accumulated loss along the path from `id` to its power
    /// source, with every cable loaded per the active strategy.
    ///
    /// Elements without a path to source get [`PathLoss::infinite`].
    pub fn loss_to_source(&mut self, id: &ElementId) -> Result<PathLoss, Error> {
        let reference = self.config.reference_voltage;
        let load = self.config.loss_strategy.path_load();
        let Some(path) = self.path_to_source_ids(id)? else {
            return Ok(path_loss(None, load, reference));
        };
        let steps = path
            .iter()
            .map(|id| {
                self.element(id).map(|element| match element {
                    Element::Pdu(_) => PathStep::Pdu,
                    Element::Cable(cable) => PathStep::Cable {
                        size: cable.power_size,
                        length_m: self.cable_length_m(cable),
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(path_loss(Some(&steps), load, reference))
    }
}
