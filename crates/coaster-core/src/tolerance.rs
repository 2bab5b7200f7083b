/// Tolerances for geometric comparisons along a curve.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for distances and vector magnitudes (in model units)
    pub linear: f64,
    /// Sine of the smallest angle two vectors may enclose before they count as parallel
    pub angular: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-9;
    pub const DEFAULT_ANGULAR: f64 = 1e-7;

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            angular: Self::DEFAULT_ANGULAR,
        }
    }

    /// Check if two values are equal within linear tolerance
    pub fn linear_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }

    /// Check if a value is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Check if two points coincide, comparing each coordinate.
    pub fn points_eq(self, a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(&x, &y)| self.linear_eq(x, y))
    }

    /// Check if two directions are parallel given `|a × b|` and `|a| |b|`.
    pub fn is_parallel(self, cross_length: f64, length_product: f64) -> bool {
        length_product < self.linear || cross_length < self.angular * length_product
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_eq() {
        let tol = Tolerance::default();
        assert!(tol.points_eq([1.0, 2.0, 3.0], [1.0, 2.0, 3.0 + 1e-12]));
        assert!(!tol.points_eq([1.0, 2.0, 3.0], [1.0, 2.0001, 3.0]));
    }

    #[test]
    fn test_is_parallel() {
        let tol = Tolerance::default();
        assert!(tol.is_parallel(0.0, 1.0));
        assert!(tol.is_parallel(1e-9, 1.0));
        assert!(!tol.is_parallel(0.5, 1.0));
        // a zero-length operand has no direction at all
        assert!(tol.is_parallel(0.0, 0.0));
    }
}
