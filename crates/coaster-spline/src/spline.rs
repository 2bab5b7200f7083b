//! Natural cubic spline through 3D waypoints, in piecewise Bezier form.

use coaster_core::traits::Validate;
use coaster_core::{CoasterError, ConstructionError, DomainWarning, Result};
use coaster_math::{Aabb3, Point3, Vector3};
use rayon::prelude::*;

use crate::arc_length::ArcLengthTable;
use crate::config::SplineConfig;
use crate::curve::Curve;
use crate::frame::{self, Frame};
use crate::segment::BezierSegment;
use crate::solver;
use crate::waypoints::Waypoints;

/// A global parameter resolved to one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Parameter after clamping or wrapping.
    pub u: f64,
    pub segment: usize,
    /// Local parameter in `[0, 1]`.
    pub t: f64,
    /// Set when an open-curve query was clamped into the domain.
    pub warning: Option<DomainWarning>,
}

/// An immutable C²-continuous curve through a waypoint sequence.
///
/// The parameter `u` runs over `[0, N - 1]`, one unit per segment. Closed
/// curves wrap `u` modulo `N - 1`; open curves clamp it. Everything is
/// computed in [`NaturalSpline::with_config`]; queries only read.
#[derive(Debug, Clone)]
pub struct NaturalSpline {
    waypoints: Waypoints,
    controls: Vec<[Point3; 2]>,
    segments: Vec<BezierSegment>,
    lengths: ArcLengthTable,
    max_height: f64,
    config: SplineConfig,
}

impl NaturalSpline {
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        Self::with_config(points, SplineConfig::default())
    }

    pub fn with_config(points: Vec<Point3>, config: SplineConfig) -> Result<Self> {
        config.validate()?;
        let waypoints = Waypoints::new(points, config.tolerance)?;
        let closed = waypoints.is_closed();

        let controls =
            solver::solve_control_points(waypoints.points(), closed, config.singular_threshold)?;

        let segments: Vec<BezierSegment> = waypoints
            .points()
            .windows(2)
            .zip(&controls)
            .map(|(ends, [a, b])| BezierSegment::new(ends[0], *a, *b, ends[1]))
            .collect();

        let lengths = ArcLengthTable::build(&segments, config.simpson_intervals);
        if let Some((segment, length)) = lengths
            .segment_lengths()
            .enumerate()
            .find(|&(_, len)| len.is_nan() || len <= config.tolerance.linear)
        {
            return Err(ConstructionError::ZeroLengthSegment { segment, length }.into());
        }

        let mut spline = Self {
            waypoints,
            controls,
            segments,
            lengths,
            max_height: 0.0,
            config,
        };
        spline.max_height = spline.sample_max_height();

        tracing::debug!(
            waypoints = spline.waypoints.len(),
            closed,
            total_length = spline.total_length(),
            max_height = spline.max_height,
            "spline built"
        );

        Ok(spline)
    }

    fn sample_max_height(&self) -> f64 {
        let (u_min, u_max) = self.domain();
        let n = self.config.height_samples;
        let mut samples: Vec<Point3> = (0..=n)
            .into_par_iter()
            .map(|i| self.coordinate(u_min + (u_max - u_min) * i as f64 / n as f64))
            .collect();
        samples.extend_from_slice(self.waypoints.points());

        let axis = self.config.height_axis;
        let highest = Aabb3::from_points(&samples).map_or(0.0, |bounds| bounds.max_along(axis));
        highest + self.config.height_margin
    }

    pub fn waypoints(&self) -> &[Point3] {
        self.waypoints.points()
    }

    /// Two interior control points per segment.
    pub fn control_points(&self) -> &[[Point3; 2]] {
        &self.controls
    }

    pub fn segments(&self) -> &[BezierSegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_closed(&self) -> bool {
        self.waypoints.is_closed()
    }

    pub fn config(&self) -> &SplineConfig {
        &self.config
    }

    /// `(u_min, u_max)` = `(0, N - 1)`.
    pub fn domain(&self) -> (f64, f64) {
        (0.0, self.segments.len() as f64)
    }

    pub fn arc_length_table(&self) -> &ArcLengthTable {
        &self.lengths
    }

    /// Length from the start to each waypoint; `[0]` is zero.
    pub fn cumulative_lengths(&self) -> &[f64] {
        self.lengths.cumulative()
    }

    pub fn total_length(&self) -> f64 {
        self.lengths.total()
    }

    /// Sampled maximum along the height axis, including the margin.
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// Map a global parameter to a segment and local parameter.
    pub fn locate(&self, u: f64) -> Location {
        let (u_min, u_max) = self.domain();
        let mut warning = None;

        let resolved = if !u.is_finite() {
            warning = Some(DomainWarning { u, min: u_min, max: u_max, clamped: u_min });
            u_min
        } else if self.is_closed() {
            (u - u_min).rem_euclid(u_max - u_min) + u_min
        } else if u < u_min || u > u_max {
            let clamped = u.clamp(u_min, u_max);
            warning = Some(DomainWarning { u, min: u_min, max: u_max, clamped });
            clamped
        } else {
            u
        };

        if let Some(warning) = &warning {
            tracing::debug!(%warning, "query outside domain");
        }

        let segment = (resolved.floor() as usize).min(self.segments.len() - 1);
        let t = (resolved - segment as f64).clamp(0.0, 1.0);
        Location {
            u: resolved,
            segment,
            t,
            warning,
        }
    }

    pub fn coordinate(&self, u: f64) -> Point3 {
        let loc = self.locate(u);
        self.segments[loc.segment].position(loc.t)
    }

    /// First derivative `dP/du`.
    pub fn tangent(&self, u: f64) -> Vector3 {
        let loc = self.locate(u);
        self.segments[loc.segment].derivative(loc.t)
    }

    /// Second derivative `d²P/du²`.
    pub fn normal(&self, u: f64) -> Vector3 {
        let loc = self.locate(u);
        self.segments[loc.segment].second_derivative(loc.t)
    }

    /// `tangent × normal`.
    pub fn binormal(&self, u: f64) -> Vector3 {
        let loc = self.locate(u);
        let seg = &self.segments[loc.segment];
        seg.derivative(loc.t).cross(seg.second_derivative(loc.t))
    }

    /// `|P' × P''| / |P'|³`, zero where the curve does not move.
    pub fn curvature(&self, u: f64) -> f64 {
        let loc = self.locate(u);
        let seg = &self.segments[loc.segment];
        let d1 = seg.derivative(loc.t);
        let speed = d1.length();
        if self.config.tolerance.is_zero(speed) {
            return 0.0;
        }
        d1.cross(seg.second_derivative(loc.t)).length() / (speed * speed * speed)
    }

    /// `ds/du` at `u`.
    pub fn parametric_speed(&self, u: f64) -> f64 {
        let loc = self.locate(u);
        self.segments[loc.segment].speed(loc.t)
    }

    /// Arc length from `u_min` to `u`.
    ///
    /// `u` is clamped to the domain for open and closed curves alike, so the
    /// result is monotone and `length(u_max)` is the total length.
    pub fn length(&self, u: f64) -> f64 {
        let (u_min, u_max) = self.domain();
        let u = if u.is_nan() { u_min } else { u.clamp(u_min, u_max) };
        let segment = (u.floor() as usize).min(self.segments.len() - 1);
        self.lengths.length_at(segment, u - segment as f64)
    }

    /// Parameter at arc length `s`.
    ///
    /// Closed curves wrap `s` modulo the total length. Open curves accept `s`
    /// up to one inverter threshold beyond either end.
    pub fn inv_length(&self, s: f64) -> Result<f64> {
        let total = self.total_length();
        let threshold = self.config.inverter.threshold;
        if !s.is_finite() {
            return Err(CoasterError::ArcLengthOutOfRange { s, total });
        }

        let target = if self.is_closed() {
            if (0.0..=total).contains(&s) {
                s
            } else {
                s.rem_euclid(total)
            }
        } else {
            if s < -threshold || s > total + threshold {
                return Err(CoasterError::ArcLengthOutOfRange { s, total });
            }
            s.clamp(0.0, total)
        };

        let inversion = self.config.inverter.invert(
            target,
            self.domain(),
            total,
            |u| self.length(u),
            |u| self.parametric_speed(u),
        )?;
        Ok(inversion.u)
    }

    /// Coordinate along the configured height axis.
    pub fn height(&self, u: f64) -> f64 {
        self.config.height_axis.component(self.coordinate(u))
    }

    /// Speed of a frictionless car released at the highest point: `sqrt(2 g (h_max - h(u)))`.
    pub fn speed(&self, u: f64, g: f64) -> Result<f64> {
        if !g.is_finite() || g < 0.0 {
            return Err(CoasterError::InvalidGravity { g });
        }
        let height = self.height(u);
        if height > self.max_height {
            return Err(CoasterError::HeightAboveMaximum {
                height,
                max: self.max_height,
            });
        }
        Ok((2.0 * g * (self.max_height - height)).sqrt())
    }

    /// Frame with `side` along the binormal sampled `frame_lag` behind `u`.
    pub fn frenet_frame(&self, u: f64) -> Result<Frame> {
        let lagged = u - self.config.frame_lag;
        frame::frenet_frame(
            self.tangent(u),
            self.binormal(lagged),
            self.curvature(lagged),
            self.config.min_curvature,
            self.config.tolerance,
        )
        .map_err(|degeneracy| CoasterError::DegenerateFrame { u, degeneracy })
    }

    /// Frame that keeps `up` as close to `reference_up` as the tangent allows.
    pub fn up_frame(&self, u: f64, reference_up: Vector3) -> Result<Frame> {
        frame::up_frame(self.tangent(u), reference_up, self.config.tolerance)
            .map_err(|degeneracy| CoasterError::DegenerateFrame { u, degeneracy })
    }
}

impl Curve for NaturalSpline {
    fn point_at(&self, t: f64) -> Point3 {
        self.coordinate(t)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        self.tangent(t)
    }

    fn domain(&self) -> (f64, f64) {
        NaturalSpline::domain(self)
    }

    fn is_closed(&self) -> bool {
        NaturalSpline::is_closed(self)
    }
}
