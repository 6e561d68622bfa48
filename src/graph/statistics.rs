// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Summary figures of a power grid.

use std::collections::BTreeMap;

use crate::element::ElementId;
use crate::graph_traits::Geodesic;
use crate::size_catalog::PowerSize;
use crate::{Error, NetworkGraph};

/// Cable totals and worst-case paths of a grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridStatistics {
    /// Total cable length in meters, per size class.
    pub cable_length_by_size: BTreeMap<PowerSize, f64>,
    pub total_cable_length_m: f64,
    /// The PDU furthest from its source, by cable length.
    pub max_path_length: Option<(ElementId, f64)>,
    /// The PDU with the highest resistance to its source.
    pub max_path_resistance: Option<(ElementId, f64)>,
}

impl<G> NetworkGraph<G>
where
    G: Geodesic,
{
    /// Computes the grid statistics.
    ///
    /// PDUs without a path to source are left out of the path maxima.  On
    /// ties, the PDU with the smallest id wins.
    pub fn statistics(&mut self) -> Result<GridStatistics, Error> {
        let mut stats = GridStatistics::default();
        for cable in self.cables() {
            let length = self.cable_length_m(cable);
            *stats
                .cable_length_by_size
                .entry(cable.power_size)
                .or_default() += length;
            stats.total_cable_length_m += length;
        }

        let pdus = self.pdus().map(|p| p.id.clone()).collect::<Vec<_>>();
        for id in pdus {
            let loss = self.loss_to_source(&id)?;
            if loss.is_infinite() {
                continue;
            }
            if stats
                .max_path_length
                .as_ref()
                .map_or(true, |(_, max)| loss.length_m > *max)
            {
                stats.max_path_length = Some((id.clone(), loss.length_m));
            }
            if stats
                .max_path_resistance
                .as_ref()
                .map_or(true, |(_, max)| loss.resistance > *max)
            {
                stats.max_path_resistance = Some((id, loss.resistance));
            }
        }

        tracing::debug!(
            "{:.1} m of cable in {} size classes.",
            stats.total_cable_length_m,
            stats.cable_length_by_size.len()
        );
        Ok(stats)
    }
}
