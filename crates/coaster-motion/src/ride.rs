//! Gravity-driven motion along a spline, one time step at a time.

use std::sync::Arc;

use coaster_core::traits::Validate;
use coaster_core::{CoasterError, Result};
use coaster_spline::{FrameKind, FrameTracker, NaturalSpline};
use serde::{Deserialize, Serialize};

use crate::pose::Pose;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RideConfig {
    /// Gravitational acceleration, in length units per second squared.
    pub gravity: f64,
    pub frame: FrameKind,
}

impl Default for RideConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            frame: FrameKind::default(),
        }
    }
}

impl Validate for RideConfig {
    fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(CoasterError::InvalidGravity { g: self.gravity });
        }
        Ok(())
    }
}

/// State of the car after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RideSample {
    pub pose: Pose,
    pub speed: f64,
    /// Completed laps of a closed curve.
    pub lap: u64,
    /// The car reached the end of an open curve and stays there.
    pub finished: bool,
}

/// A car released at the start of a spline, moving at the energy-conserving
/// speed `sqrt(2 g (h_max − h))`.
///
/// Each [`advance`](Ride::advance) integrates arc length with one explicit
/// Euler step and maps it back to a parameter. Closed curves loop forever;
/// open curves stop at the end.
#[derive(Debug, Clone)]
pub struct Ride {
    spline: Arc<NaturalSpline>,
    config: RideConfig,
    tracker: FrameTracker,
    u: f64,
    s: f64,
    lap: u64,
    finished: bool,
}

impl Ride {
    pub fn new(spline: Arc<NaturalSpline>, config: RideConfig) -> Result<Self> {
        config.validate()?;
        let (u_min, _) = spline.domain();
        Ok(Self {
            spline,
            tracker: FrameTracker::new(config.frame),
            config,
            u: u_min,
            s: 0.0,
            lap: 0,
            finished: false,
        })
    }

    pub fn spline(&self) -> &Arc<NaturalSpline> {
        &self.spline
    }

    pub fn config(&self) -> &RideConfig {
        &self.config
    }

    pub fn u(&self) -> f64 {
        self.u
    }

    pub fn s(&self) -> f64 {
        self.s
    }

    pub fn lap(&self) -> u64 {
        self.lap
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Back to the start with no laps.
    pub fn reset(&mut self) {
        self.u = self.spline.domain().0;
        self.s = 0.0;
        self.lap = 0;
        self.finished = false;
        self.tracker.reset();
    }

    /// Sample at the current position without moving.
    pub fn current(&mut self) -> Result<RideSample> {
        self.sample()
    }

    /// Move the car forward by `dt` seconds.
    pub fn advance(&mut self, dt: f64) -> Result<RideSample> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(CoasterError::InvalidTimeStep { dt });
        }
        if self.finished {
            return self.sample();
        }

        let speed = self.spline.speed(self.u, self.config.gravity)?;
        let total = self.spline.total_length();
        let mut s = self.s + speed * dt;

        if self.spline.is_closed() {
            if s >= total {
                let laps = (s / total).floor();
                s -= laps * total;
                self.lap += laps as u64;
                tracing::debug!(lap = self.lap, "lap completed");
            }
        } else if s >= total {
            s = total;
            self.finished = true;
            tracing::debug!(total, "reached end of track");
        }

        self.u = self.spline.inv_length(s)?;
        self.s = s;
        self.sample()
    }

    fn sample(&mut self) -> Result<RideSample> {
        let frame = self.tracker.frame_at(&self.spline, self.u)?;
        Ok(RideSample {
            pose: Pose {
                u: self.u,
                s: self.s,
                position: self.spline.coordinate(self.u),
                frame,
            },
            speed: self.spline.speed(self.u, self.config.gravity)?,
            lap: self.lap,
            finished: self.finished,
        })
    }
}
