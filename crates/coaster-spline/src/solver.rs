//! Interior control points from C¹/C² continuity constraints.
//!
//! Unknowns are laid out two per segment: `x[2i]` is the first control point
//! of segment `i`, `x[2i + 1]` the second. For `N` waypoints there are
//! `2N - 2` unknowns and as many rows:
//!
//! * rows `0..N-2`: tangency at waypoint `i + 1`,
//!   `x[2i+1] + x[2i+2] = 2 P[i+1]`
//! * rows `N-2..2N-4`: curvature at waypoint `i + 1`,
//!   `x[2i] - 2 x[2i+1] + 2 x[2i+2] - x[2i+3] = 0`
//! * the last two rows: natural ends for an open curve, or the same two
//!   constraints across the wrap for a closed one.
//!
//! The matrix depends only on `N` and `closed`; each coordinate axis gets its
//! own right-hand side and is solved against one factorization.

use coaster_math::{DenseSystem, Point3};
use nalgebra::DMatrix;

use coaster_core::Result;

/// Build the `(2N-2) x (2N-2)` constraint matrix.
pub fn constraint_matrix(n: usize, closed: bool) -> DMatrix<f64> {
    let m = 2 * n - 2;
    let mut a = DMatrix::zeros(m, m);

    for i in 0..n - 2 {
        a[(i, 2 * i + 1)] = 1.0;
        a[(i, 2 * i + 2)] = 1.0;

        let row = i + n - 2;
        a[(row, 2 * i)] = 1.0;
        a[(row, 2 * i + 1)] = -2.0;
        a[(row, 2 * i + 2)] = 2.0;
        a[(row, 2 * i + 3)] = -1.0;
    }

    if closed {
        a[(m - 2, 0)] = 1.0;
        a[(m - 2, m - 1)] = 1.0;

        a[(m - 1, m - 2)] = 1.0;
        a[(m - 1, m - 1)] = -2.0;
        a[(m - 1, 0)] = 2.0;
        a[(m - 1, 1)] = -1.0;
    } else {
        a[(m - 2, 0)] = -2.0;
        a[(m - 2, 1)] = 1.0;

        a[(m - 1, m - 2)] = 1.0;
        a[(m - 1, m - 1)] = -2.0;
    }

    a
}

/// Right-hand side for one coordinate, given that coordinate of every waypoint.
pub fn constraint_rhs(coords: &[f64], closed: bool) -> Vec<f64> {
    let n = coords.len();
    let m = 2 * n - 2;
    let mut b = vec![0.0; m];

    for i in 0..n - 2 {
        b[i] = 2.0 * coords[i + 1];
    }

    if closed {
        b[m - 2] = 2.0 * coords[0];
    } else {
        b[m - 2] = -coords[0];
        b[m - 1] = -coords[n - 1];
    }

    b
}

/// Solve for the two control points of every segment.
///
/// `waypoints` must hold at least 3 points; callers validate first.
pub fn solve_control_points(
    waypoints: &[Point3],
    closed: bool,
    singular_threshold: f64,
) -> Result<Vec<[Point3; 2]>> {
    let n = waypoints.len();
    let system = DenseSystem::new(constraint_matrix(n, closed), singular_threshold)?;

    let mut axes = Vec::with_capacity(3);
    for axis in 0..3 {
        let coords: Vec<f64> = waypoints.iter().map(|p| p[axis]).collect();
        axes.push(system.solve(&constraint_rhs(&coords, closed))?);
    }

    let controls = (0..n - 1)
        .map(|i| {
            let at = |k: usize| Point3::new(axes[0][k], axes[1][k], axes[2][k]);
            [at(2 * i), at(2 * i + 1)]
        })
        .collect();

    Ok(controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use coaster_core::{CoasterError, ConstructionError};
    use coaster_math::DVec3;

    fn square() -> Vec<Point3> {
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_matrix_shape_and_rows() {
        let a = constraint_matrix(4, false);
        assert_eq!(a.shape(), (6, 6));
        let row = |i: usize| a.row(i).iter().copied().collect::<Vec<_>>();
        // tangency row for waypoint 1
        assert_eq!(row(0), vec![0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        // curvature row for waypoint 2
        assert_eq!(row(3), vec![0.0, 0.0, 1.0, -2.0, 2.0, -1.0]);
    }

    #[test]
    fn test_open_square_control_points() {
        let controls = solve_control_points(&square(), false, 1e-12).unwrap();
        assert_eq!(controls.len(), 3);
        assert_abs_diff_eq!(controls[0][0].x, 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(controls[0][0].y, -1.0 / 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(controls[1][1].x, 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(controls[1][1].y, 7.0 / 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(controls[2][1].x, 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(controls[2][1].y, 10.0 / 9.0, epsilon = 1e-12);
        for pair in &controls {
            assert_abs_diff_eq!(pair[0].z, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(pair[1].z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_closed_square_is_symmetric() {
        let mut points = square();
        points.push(points[0]);
        let controls = solve_control_points(&points, true, 1e-12).unwrap();
        assert_eq!(controls.len(), 4);
        assert!((controls[0][0] - DVec3::new(0.25, -0.25, 0.0)).length() < 1e-12);
        assert!((controls[0][1] - DVec3::new(0.75, -0.25, 0.0)).length() < 1e-12);
        assert!((controls[3][0] - DVec3::new(-0.25, 0.75, 0.0)).length() < 1e-12);
        assert!((controls[3][1] - DVec3::new(-0.25, 0.25, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_collinear_points_keep_controls_on_line() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::X * 2.0];
        let controls = solve_control_points(&points, false, 1e-12).unwrap();
        assert!((controls[0][0] - DVec3::X / 3.0).length() < 1e-12);
        assert!((controls[0][1] - DVec3::X * (2.0 / 3.0)).length() < 1e-12);
        assert!((controls[1][0] - DVec3::X * (4.0 / 3.0)).length() < 1e-12);
        assert!((controls[1][1] - DVec3::X * (5.0 / 3.0)).length() < 1e-12);
    }

    #[test]
    fn test_threshold_above_condition_is_singular() {
        let err = solve_control_points(&square(), false, 0.9).unwrap_err();
        assert!(matches!(
            err,
            CoasterError::Construction(ConstructionError::SingularSystem { .. })
        ));
    }
}
