// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Resistive loss calculations for single cables and for paths of cables.
//!
//! Everything in this module is a pure function of its arguments.  The
//! [`NetworkGraph`][crate::NetworkGraph] uses these functions to push current
//! and voltage downstream from the power sources, and to compute the loss
//! along the path from any element back to its source.

use crate::size_catalog::{Phases, PowerSize};

/// Line-to-line reference voltage at the power sources.
pub const REFERENCE_VOLTAGE_LL: f64 = 400.0;

/// Line-to-neutral reference voltage.
pub const REFERENCE_VOLTAGE_LN: f64 = REFERENCE_VOLTAGE_LL / SQRT_3;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// How much current a cable is assumed to carry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoadModel {
    /// An explicit current in amperes, clamped to the cable's ampacity.
    Current(f64),
    /// A percentage of the cable's ampacity.
    Percentage(f64),
    /// No load.
    Unloaded,
}

/// Returns the current a cable of the given ampacity carries under `load`.
pub fn cable_current(load: LoadModel, max_amps: f64) -> f64 {
    match load {
        LoadModel::Current(amps) => amps.min(max_amps),
        LoadModel::Percentage(percent) => max_amps * percent / 100.0,
        LoadModel::Unloaded => 0.0,
    }
}

/// Resistance, voltage drop and power loss of a single cable segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentLoss {
    pub resistance: f64,
    pub voltage_drop: f64,
    pub power_loss: f64,
}

/// Computes the loss of a segment of `length_m` meters carrying `current`.
///
/// Single phase drops are doubled to account for the return conductor.  A
/// segment with non-finite resistance loses everything, regardless of
/// current.
pub fn cable_loss(phases: Phases, ohm_per_km: f64, length_m: f64, current: f64) -> SegmentLoss {
    let resistance = length_m * ohm_per_km / 1000.0;
    if !resistance.is_finite() {
        return SegmentLoss {
            resistance: f64::INFINITY,
            voltage_drop: f64::INFINITY,
            power_loss: f64::INFINITY,
        };
    }
    let voltage_drop = match phases {
        Phases::Three => resistance * current * SQRT_3,
        Phases::Single => resistance * current * 2.0,
    };
    SegmentLoss {
        resistance,
        voltage_drop,
        power_loss: voltage_drop * current,
    }
}

/// Loss snapshot of a cable, as recorded during loss propagation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CableLoss {
    pub phases: Phases,
    pub length_m: f64,
    pub resistance: f64,
    pub current: f64,
    /// Voltage at the upstream end of the cable.
    pub voltage_in: f64,
    pub voltage_drop: f64,
    pub power_loss: f64,
}

impl CableLoss {
    /// Computes the loss of a cable of the given size and length, fed at
    /// `voltage_in` and carrying `current`.
    pub fn compute(size: PowerSize, length_m: f64, voltage_in: f64, current: f64) -> Self {
        let info = size.info();
        let segment = cable_loss(info.phases, info.ohm_per_km, length_m, current);
        Self {
            phases: info.phases,
            length_m,
            resistance: segment.resistance,
            current,
            voltage_in,
            voltage_drop: segment.voltage_drop,
            power_loss: segment.power_loss,
        }
    }
}

/// Loss snapshot of a PDU, as recorded during loss propagation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PduLoss {
    pub voltage_in: f64,
    pub current_in: f64,
    pub current_load: f64,
}

/// A loss snapshot of either kind of element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ElementLoss {
    Pdu(PduLoss),
    Cable(CableLoss),
}

impl ElementLoss {
    pub fn as_pdu(&self) -> Option<&PduLoss> {
        match self {
            ElementLoss::Pdu(loss) => Some(loss),
            ElementLoss::Cable(_) => None,
        }
    }

    pub fn as_cable(&self) -> Option<&CableLoss> {
        match self {
            ElementLoss::Cable(loss) => Some(loss),
            ElementLoss::Pdu(_) => None,
        }
    }
}

/// One element of a path to source, as seen by [`path_loss`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathStep {
    Pdu,
    Cable { size: PowerSize, length_m: f64 },
}

/// Accumulated loss along a path to source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathLoss {
    /// The smallest phase count of any cable on the path.
    pub phases: Phases,
    pub length_m: f64,
    pub resistance: f64,
    /// The smallest ampacity of any cable on the path.
    pub limiting_current: f64,
    /// The reference voltage the drop is relative to.
    pub voltage: f64,
    pub voltage_drop_ll: f64,
    pub voltage_drop_percent: f64,
    pub power_loss: f64,
}

impl PathLoss {
    /// The loss of an element that has no path to a source.
    pub fn infinite(reference_voltage: f64) -> Self {
        Self {
            phases: Phases::Three,
            length_m: f64::INFINITY,
            resistance: f64::INFINITY,
            limiting_current: 0.0,
            voltage: reference_voltage,
            voltage_drop_ll: f64::INFINITY,
            voltage_drop_percent: 100.0,
            power_loss: 0.0,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.length_m.is_infinite() && self.resistance.is_infinite()
    }
}

/// Computes the loss along `path`, with each cable loaded per `load`.
///
/// Each cable's drop is computed at its own current and in its own phase
/// convention; the sum is divided by √3 to refer it back to line-to-line.
/// A missing or empty path, or a path through a cable of unknown size,
/// returns [`PathLoss::infinite`].
pub fn path_loss(path: Option<&[PathStep]>, load: LoadModel, reference_voltage: f64) -> PathLoss {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return PathLoss::infinite(reference_voltage);
    };

    let mut length_m = 0.0;
    let mut resistance = 0.0;
    let mut limiting_current = f64::INFINITY;
    let mut phases = Phases::Three;
    let mut voltage_drop = 0.0;
    let mut power_loss = 0.0;

    for step in path {
        let PathStep::Cable { size, length_m: cable_length } = *step else {
            continue;
        };
        if size.is_unknown() {
            return PathLoss::infinite(reference_voltage);
        }
        let info = size.info();
        let current = cable_current(load, info.max_amps);
        let segment = cable_loss(info.phases, info.ohm_per_km, cable_length, current);

        length_m += cable_length;
        resistance += segment.resistance;
        phases = phases.min(info.phases);
        limiting_current = limiting_current.min(info.max_amps);
        voltage_drop += segment.voltage_drop;
        power_loss += segment.power_loss;
    }

    let voltage_drop_ll = voltage_drop / SQRT_3;
    PathLoss {
        phases,
        length_m,
        resistance,
        limiting_current,
        voltage: reference_voltage,
        voltage_drop_ll,
        voltage_drop_percent: voltage_drop_ll / reference_voltage * 100.0,
        power_loss,
    }
}

/// The strategy for pushing current downstream from a power source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LossStrategy {
    /// Every cable is loaded at `load_fraction` of its own ampacity,
    /// independently of its siblings.
    Capacity { load_fraction: f64 },
    /// The current entering a PDU is split across its outgoing cables in
    /// proportion to their ampacity, skewed towards larger cables as
    /// `load_fraction` grows.
    Flow { load_fraction: f64 },
}

impl LossStrategy {
    pub fn load_fraction(&self) -> f64 {
        match self {
            LossStrategy::Capacity { load_fraction } | LossStrategy::Flow { load_fraction } => {
                *load_fraction
            }
        }
    }

    /// The load model applied to each cable of a path to source.
    pub fn path_load(&self) -> LoadModel {
        LoadModel::Percentage(self.load_fraction() * 100.0)
    }
}

/// Splits `current_in` across sibling cables with the given ampacities.
///
/// With a `load_fraction` of zero, the split is purely proportional to
/// ampacity.  Larger fractions keep back more of the current from the
/// smaller cables, relative to the largest size class.
pub fn flow_split(current_in: f64, load_fraction: f64, sibling_max_amps: &[f64]) -> Vec<f64> {
    let total: f64 = sibling_max_amps.iter().filter(|amps| **amps > 0.0).sum();
    let largest = PowerSize::ThreePhase250.info().max_amps;
    sibling_max_amps
        .iter()
        .map(|&max_amps| {
            if total <= 0.0 || max_amps <= 0.0 {
                return 0.0;
            }
            let forward = 1.0 - load_fraction * (1.0 - max_amps / largest);
            current_in * forward * (max_amps / total)
        })
        .collect()
}
