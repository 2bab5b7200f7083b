use thiserror::Error;

/// Failure while building a curve. No partial curve survives one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error("At least 3 waypoints are required, got {count}")]
    TooFewWaypoints { count: usize },

    #[error("Waypoint {index} has a non-finite coordinate")]
    NonFiniteWaypoint { index: usize },

    #[error("Waypoint {index} duplicates waypoint {}", .index - 1)]
    DuplicateWaypoint { index: usize },

    #[error("Segment {segment} has zero length ({length})")]
    ZeroLengthSegment { segment: usize, length: f64 },

    #[error("Constraint matrix is singular or ill-conditioned (rcond = {reciprocal_condition:e})")]
    SingularSystem { reciprocal_condition: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a frame could not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Degeneracy {
    /// The reference up vector is zero or parallel to the tangent.
    #[error("reference vector parallel to tangent")]
    ParallelReference,
    /// Curvature vanishes, so the binormal has no direction.
    #[error("curvature is zero")]
    ZeroCurvature,
    /// The curve does not move at this parameter.
    #[error("tangent is zero")]
    ZeroTangent,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoasterError {
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Degenerate frame at u={u}: {degeneracy}")]
    DegenerateFrame { u: f64, degeneracy: Degeneracy },

    #[error("Inversion of s={target} stopped after {iterations} iterations, residual {residual}")]
    InversionDidNotConverge {
        target: f64,
        iterations: usize,
        residual: f64,
    },

    #[error("Arc length {s} outside [0, {total}]")]
    ArcLengthOutOfRange { s: f64, total: f64 },

    #[error("Height {height} exceeds sampled maximum {max}")]
    HeightAboveMaximum { height: f64, max: f64 },

    #[error("Invalid gravity: {g}")]
    InvalidGravity { g: f64 },

    #[error("Time step must be finite and non-negative, got {dt}")]
    InvalidTimeStep { dt: f64 },
}

impl CoasterError {
    pub fn is_construction(&self) -> bool {
        matches!(self, CoasterError::Construction(_))
    }
}

pub type Result<T> = std::result::Result<T, CoasterError>;

/// A query outside the parameter domain of an open curve.
///
/// Not an error: the parameter is clamped to `clamped` and evaluation
/// proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Parameter {u} outside [{min}, {max}], clamped to {clamped}")]
pub struct DomainWarning {
    pub u: f64,
    pub min: f64,
    pub max: f64,
    pub clamped: f64,
}
