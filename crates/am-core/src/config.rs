//! Simulation configuration.

use crate::{CoreError, CoreResult};

/// Top-level simulation configuration.
///
/// Typically built with `..SimConfig::default()` or loaded from JSON by the
/// host application and passed to the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Minimum speed of any scheduled or active leg, in distance units per
    /// tick.  Slower requests fail rather than being clamped.
    pub min_speed: f64,

    /// Length of one movement sub-step as a fraction of a tick.
    pub step_precision: f64,

    /// An agent within this distance of its goal point has arrived.
    pub arrival_epsilon: f64,

    /// Observer samples are published every this many sub-steps.  Purely
    /// cosmetic; has no effect on movement.
    pub sampling_interval: u64,

    /// Goal coordinates may lie up to this far outside the goal place.
    pub boundary_buffer: f64,

    /// Raw frame-sample units that make up one tick (e.g. `1000.0 / 60.0`
    /// for millisecond timestamps at 60 ticks per second).
    pub sample_units_per_tick: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            min_speed:             0.1,
            step_precision:        0.001,
            arrival_epsilon:       0.1,
            sampling_interval:     1,
            boundary_buffer:       0.5,
            sample_units_per_tick: 1.0,
            seed:                  0,
        }
    }
}

impl SimConfig {
    /// Reject values the movement arithmetic cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.min_speed > 0.0) {
            return Err(CoreError::Config(format!("min_speed must be positive, got {}", self.min_speed)));
        }
        if !(self.step_precision > 0.0 && self.step_precision <= 1.0) {
            return Err(CoreError::Config(format!(
                "step_precision must be in (0, 1], got {}",
                self.step_precision
            )));
        }
        if !(self.arrival_epsilon > 0.0) {
            return Err(CoreError::Config(format!(
                "arrival_epsilon must be positive, got {}",
                self.arrival_epsilon
            )));
        }
        if self.sampling_interval == 0 {
            return Err(CoreError::Config("sampling_interval must be at least 1".into()));
        }
        if self.boundary_buffer < 0.0 {
            return Err(CoreError::Config(format!(
                "boundary_buffer must not be negative, got {}",
                self.boundary_buffer
            )));
        }
        if !(self.sample_units_per_tick > 0.0) {
            return Err(CoreError::Config(format!(
                "sample_units_per_tick must be positive, got {}",
                self.sample_units_per_tick
            )));
        }
        Ok(())
    }
}
