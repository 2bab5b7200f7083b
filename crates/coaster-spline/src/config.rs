//! Tunable numerics for spline construction and queries.

use coaster_core::traits::Validate;
use coaster_core::{ConstructionError, Result, Tolerance};
use coaster_math::{Axis, DenseSystem};
use serde::{Deserialize, Serialize};

use crate::inverse::Inverter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineConfig {
    /// Simpson subintervals per segment (even, at least 2).
    pub simpson_intervals: usize,
    pub inverter: Inverter,
    /// Parameter offset behind the query point for the Frenet binormal.
    pub frame_lag: f64,
    /// Curvature below which the Frenet frame is degenerate.
    pub min_curvature: f64,
    pub height_axis: Axis,
    pub height_samples: usize,
    /// Added to the sampled maximum height.
    pub height_margin: f64,
    /// Lower bound on the reciprocal condition number of the constraint matrix.
    pub singular_threshold: f64,
    pub tolerance: Tolerance,
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            simpson_intervals: 10,
            inverter: Inverter::default(),
            frame_lag: 0.01,
            min_curvature: 1e-6,
            height_axis: Axis::Z,
            height_samples: 1000,
            height_margin: 0.05,
            singular_threshold: DenseSystem::DEFAULT_THRESHOLD,
            tolerance: Tolerance::default(),
        }
    }
}

fn invalid(message: impl Into<String>) -> coaster_core::CoasterError {
    ConstructionError::InvalidConfig(message.into()).into()
}

impl Validate for SplineConfig {
    fn validate(&self) -> Result<()> {
        if self.simpson_intervals < 2 || self.simpson_intervals % 2 != 0 {
            return Err(invalid(format!(
                "simpson_intervals must be even and >= 2, got {}",
                self.simpson_intervals
            )));
        }
        if !(self.inverter.threshold.is_finite() && self.inverter.threshold > 0.0) {
            return Err(invalid("inverter threshold must be positive"));
        }
        if self.inverter.max_iterations == 0 {
            return Err(invalid("inverter max_iterations must be at least 1"));
        }
        if !(self.frame_lag.is_finite() && self.frame_lag >= 0.0) {
            return Err(invalid("frame_lag must be finite and non-negative"));
        }
        if !(self.min_curvature.is_finite() && self.min_curvature >= 0.0) {
            return Err(invalid("min_curvature must be finite and non-negative"));
        }
        if self.height_samples == 0 {
            return Err(invalid("height_samples must be at least 1"));
        }
        if !(self.height_margin.is_finite() && self.height_margin >= 0.0) {
            return Err(invalid("height_margin must be finite and non-negative"));
        }
        if !(self.singular_threshold.is_finite() && self.singular_threshold > 0.0) {
            return Err(invalid("singular_threshold must be positive"));
        }
        Ok(())
    }
}
