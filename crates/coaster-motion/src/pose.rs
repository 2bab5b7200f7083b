use coaster_math::{DAffine3, Point3};
use coaster_spline::Frame;
use serde::{Deserialize, Serialize};

/// Position and orientation at one parameter of a spline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub u: f64,
    /// Arc length from the start of the curve to `u`.
    pub s: f64,
    pub position: Point3,
    pub frame: Frame,
}

impl Pose {
    /// Local-to-world transform: x = side, y = up, z = forward.
    pub fn to_affine(&self) -> DAffine3 {
        DAffine3::from_mat3_translation(self.frame.to_mat3(), self.position)
    }

    /// Point displaced from the centerline along the frame's side and up axes.
    pub fn offset(&self, side: f64, up: f64) -> Point3 {
        self.position + self.frame.side * side + self.frame.up * up
    }
}
