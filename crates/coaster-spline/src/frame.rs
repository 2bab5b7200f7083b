//! Orthonormal orientation frames along a curve.

use coaster_core::{CoasterError, Degeneracy, Result, Tolerance};
use coaster_math::{DMat3, Vector3};
use serde::{Deserialize, Serialize};

use crate::spline::NaturalSpline;

/// Forward/side/up basis at a point of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub forward: Vector3,
    pub side: Vector3,
    pub up: Vector3,
}

impl Frame {
    pub const fn new(forward: Vector3, side: Vector3, up: Vector3) -> Self {
        Self { forward, side, up }
    }

    /// Matrix with columns `side`, `up`, `forward`.
    ///
    /// This is a proper rotation only for right-handed frames. Up-vector
    /// frames are right-handed; Frenet frames (`up = side × forward`) are not.
    pub fn to_mat3(&self) -> DMat3 {
        DMat3::from_cols(self.side, self.up, self.forward)
    }

    pub fn is_right_handed(&self) -> bool {
        self.side.cross(self.up).dot(self.forward) > 0.0
    }

    /// The same forward direction with side and up reversed.
    pub fn flipped(self) -> Self {
        Self::new(self.forward, -self.side, -self.up)
    }

    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let unit = |v: Vector3| (v.length() - 1.0).abs() <= tolerance;
        unit(self.forward)
            && unit(self.side)
            && unit(self.up)
            && self.forward.dot(self.side).abs() <= tolerance
            && self.forward.dot(self.up).abs() <= tolerance
            && self.side.dot(self.up).abs() <= tolerance
    }
}

fn unit_tangent(
    tangent: Vector3,
    tolerance: Tolerance,
) -> std::result::Result<Vector3, Degeneracy> {
    let length = tangent.length();
    if tolerance.is_zero(length) || !length.is_finite() {
        return Err(Degeneracy::ZeroTangent);
    }
    Ok(tangent / length)
}

/// Frame stabilized against a fixed reference direction.
///
/// `side = ref × forward`, `up = forward × side`.
pub fn up_frame(
    tangent: Vector3,
    reference_up: Vector3,
    tolerance: Tolerance,
) -> std::result::Result<Frame, Degeneracy> {
    let forward = unit_tangent(tangent, tolerance)?;
    let side = reference_up.cross(forward);
    if tolerance.is_parallel(side.length(), reference_up.length()) {
        return Err(Degeneracy::ParallelReference);
    }
    let side = side.normalize();
    let up = forward.cross(side).normalize();
    Ok(Frame::new(forward, side, up))
}

/// Frame from the tangent at `u` and the binormal sampled behind `u`.
///
/// The lagged binormal is made orthogonal to `forward` before normalizing,
/// so the result is exactly orthonormal even though both inputs come from
/// different parameters. `up = side × forward`.
pub fn frenet_frame(
    tangent: Vector3,
    lagged_binormal: Vector3,
    lagged_curvature: f64,
    min_curvature: f64,
    tolerance: Tolerance,
) -> std::result::Result<Frame, Degeneracy> {
    let forward = unit_tangent(tangent, tolerance)?;
    if lagged_curvature.is_nan() || lagged_curvature <= min_curvature {
        return Err(Degeneracy::ZeroCurvature);
    }
    let along = lagged_binormal.dot(forward);
    let side = lagged_binormal - along * forward;
    if tolerance.is_parallel(side.length(), lagged_binormal.length()) {
        return Err(Degeneracy::ZeroCurvature);
    }
    let side = side.normalize();
    let up = side.cross(forward).normalize();
    Ok(Frame::new(forward, side, up))
}

/// Which frame construction a consumer follows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FrameKind {
    Frenet,
    Up { reference: Vector3 },
}

impl FrameKind {
    /// Up-vector frames against world `+Z`.
    pub fn up() -> Self {
        FrameKind::Up { reference: Vector3::Z }
    }
}

impl Default for FrameKind {
    fn default() -> Self {
        Self::up()
    }
}

/// Computes frames along a sequence of parameters, remembering the last one.
///
/// Frenet frames that degenerate (straight runs, inflections) are replaced
/// by the up-vector frame against `fallback_up`, and failing that by the
/// previous frame. A Frenet frame whose side vector reverses against the
/// previous one is flipped to keep the roll continuous.
#[derive(Debug, Clone)]
pub struct FrameTracker {
    kind: FrameKind,
    fallback_up: Vector3,
    previous: Option<Frame>,
}

impl FrameTracker {
    pub fn new(kind: FrameKind) -> Self {
        let fallback_up = match kind {
            FrameKind::Up { reference } => reference,
            FrameKind::Frenet => Vector3::Z,
        };
        Self {
            kind,
            fallback_up,
            previous: None,
        }
    }

    pub fn with_fallback_up(mut self, fallback_up: Vector3) -> Self {
        self.fallback_up = fallback_up;
        self
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn previous(&self) -> Option<Frame> {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn frame_at(&mut self, spline: &NaturalSpline, u: f64) -> Result<Frame> {
        let computed = match self.kind {
            FrameKind::Frenet => match spline.frenet_frame(u) {
                Ok(frame) => Ok(self.align(frame)),
                Err(CoasterError::DegenerateFrame { degeneracy, .. }) => {
                    tracing::debug!(u, %degeneracy, "frenet frame degenerate, using up frame");
                    spline.up_frame(u, self.fallback_up)
                }
                Err(other) => Err(other),
            },
            FrameKind::Up { reference } => spline.up_frame(u, reference),
        };

        let frame = match (computed, self.previous) {
            (Ok(frame), _) => frame,
            (Err(CoasterError::DegenerateFrame { degeneracy, .. }), Some(previous)) => {
                tracing::warn!(u, %degeneracy, "no frame at parameter, reusing previous frame");
                previous
            }
            (Err(err), _) => return Err(err),
        };

        self.previous = Some(frame);
        Ok(frame)
    }

    fn align(&self, frame: Frame) -> Frame {
        match self.previous {
            Some(previous) if frame.side.dot(previous.side) < 0.0 => frame.flipped(),
            _ => frame,
        }
    }
}
