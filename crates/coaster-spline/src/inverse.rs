//! Arc length back to curve parameter.

use coaster_core::{CoasterError, Result};
use serde::{Deserialize, Serialize};

/// Newton iteration on `length(u) = s`, safeguarded by a shrinking bracket.
///
/// `length` is monotone, so every evaluated `u` tells which side of the root
/// it is on. A Newton step that would leave the current bracket, or that
/// divides by a vanishing speed, is replaced by bisection. The iterate never
/// leaves the domain, and `max_iterations` bounds the work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inverter {
    /// Accepted `|s - length(u)|`.
    pub threshold: f64,
    pub max_iterations: usize,
}

impl Default for Inverter {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            max_iterations: 1000,
        }
    }
}

/// Result of a successful inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inversion {
    pub u: f64,
    pub iterations: usize,
    pub residual: f64,
}

/// Below this `ds/du` a Newton step is not attempted.
const MIN_SPEED: f64 = 1e-12;

impl Inverter {
    /// Find `u` in `domain` with `|target - length(u)| <= threshold`.
    ///
    /// `total` is `length(domain.1)`. Targets at or beyond either end return
    /// that end exactly.
    pub fn invert<L, S>(
        &self,
        target: f64,
        domain: (f64, f64),
        total: f64,
        length: L,
        speed: S,
    ) -> Result<Inversion>
    where
        L: Fn(f64) -> f64,
        S: Fn(f64) -> f64,
    {
        let (mut lo, mut hi) = domain;
        if target <= 0.0 {
            return Ok(Inversion { u: lo, iterations: 0, residual: target });
        }
        if target >= total {
            return Ok(Inversion { u: hi, iterations: 0, residual: target - total });
        }

        let mut u = 0.5 * (lo + hi);
        let mut residual = target - length(u);

        for iteration in 0..self.max_iterations {
            if residual.abs() <= self.threshold {
                tracing::trace!(target, u, iteration, "arc length inverted");
                return Ok(Inversion { u, iterations: iteration, residual });
            }

            if residual > 0.0 {
                lo = u;
            } else {
                hi = u;
            }

            // u ← u - residual / (-ds/du)
            let ds = speed(u);
            let newton = if ds > MIN_SPEED { u - residual / -ds } else { f64::NAN };
            u = if newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
            residual = target - length(u);
        }

        if residual.abs() <= self.threshold {
            return Ok(Inversion { u, iterations: self.max_iterations, residual });
        }

        Err(CoasterError::InversionDidNotConverge {
            target,
            iterations: self.max_iterations,
            residual,
        })
    }
}
