// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the `NetworkGraph`.

use crate::loss::{LossStrategy, REFERENCE_VOLTAGE_LL};

/// Configuration options for the `NetworkGraph`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Two points closer than this many meters are considered to be the same
    /// point when inferring connections from geometry.
    pub same_point_tolerance_m: f64,

    /// Line-to-line voltage at every power source, and the reference for
    /// voltage drop percentages.
    pub reference_voltage: f64,

    /// The strategy used to push current downstream from the power sources.
    pub loss_strategy: LossStrategy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            same_point_tolerance_m: 1.0,
            reference_voltage: REFERENCE_VOLTAGE_LL,
            loss_strategy: LossStrategy::Capacity { load_fraction: 0.5 },
        }
    }
}
