//! Natural cubic Bezier space curves: control-point solving, arc length,
//! parameter inversion and orientation frames.

pub mod arc_length;
pub mod config;
pub mod curve;
pub mod frame;
pub mod inverse;
pub mod polyline;
pub mod segment;
pub mod solver;
pub mod spline;
pub mod waypoints;

pub use arc_length::ArcLengthTable;
pub use config::SplineConfig;
pub use curve::Curve;
pub use frame::{Frame, FrameKind, FrameTracker};
pub use inverse::{Inversion, Inverter};
pub use segment::BezierSegment;
pub use spline::{Location, NaturalSpline};
pub use waypoints::Waypoints;
