//! One cubic Bezier piece of a spline.

use coaster_math::{simpson, Point3, Vector3};

use crate::curve::Curve;

/// A cubic Bezier segment over local `t ∈ [0, 1]`.
///
/// The power-basis coefficients are derived once from the four Bezier
/// points, so position and both derivatives are plain Horner evaluations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierSegment {
    points: [Point3; 4],
    /// `c[0] + c[1] t + c[2] t² + c[3] t³`
    coefficients: [Vector3; 4],
}

impl BezierSegment {
    pub fn new(start: Point3, control_a: Point3, control_b: Point3, end: Point3) -> Self {
        let coefficients = [
            start,
            3.0 * (control_a - start),
            3.0 * (start - 2.0 * control_a + control_b),
            end - start + 3.0 * (control_a - control_b),
        ];
        Self {
            points: [start, control_a, control_b, end],
            coefficients,
        }
    }

    /// The four Bezier points: start, two controls, end.
    pub fn points(&self) -> &[Point3; 4] {
        &self.points
    }

    pub fn start(&self) -> Point3 {
        self.points[0]
    }

    pub fn end(&self) -> Point3 {
        self.points[3]
    }

    pub fn position(&self, t: f64) -> Point3 {
        let [c0, c1, c2, c3] = self.coefficients;
        c0 + t * (c1 + t * (c2 + t * c3))
    }

    pub fn derivative(&self, t: f64) -> Vector3 {
        let [_, c1, c2, c3] = self.coefficients;
        c1 + t * (2.0 * c2 + t * (3.0 * c3))
    }

    pub fn second_derivative(&self, t: f64) -> Vector3 {
        let [_, _, c2, c3] = self.coefficients;
        2.0 * c2 + t * (6.0 * c3)
    }

    /// `|dP/dt|`
    pub fn speed(&self, t: f64) -> f64 {
        self.derivative(t).length()
    }

    /// Arc length over `[0, t]`.
    pub fn length_to(&self, t: f64, intervals: usize) -> f64 {
        self.length_between(0.0, t, intervals)
    }

    /// Arc length over `[a, b]` with `intervals` Simpson steps.
    pub fn length_between(&self, a: f64, b: f64, intervals: usize) -> f64 {
        simpson(|x| self.speed(x), a, b, intervals)
    }
}

impl Curve for BezierSegment {
    fn point_at(&self, t: f64) -> Point3 {
        self.position(t)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        self.derivative(t)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}
