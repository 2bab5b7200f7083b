use coaster_core::traits::Validate;
use coaster_core::{ConstructionError, Result, Tolerance};
use coaster_math::Point3;

/// Ordered points a spline must pass through.
///
/// The sequence is closed when the first and last point are bitwise equal
/// coordinate by coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoints {
    points: Vec<Point3>,
    closed: bool,
    tolerance: Tolerance,
}

impl Waypoints {
    pub const MIN_COUNT: usize = 3;

    pub fn new(points: Vec<Point3>, tolerance: Tolerance) -> Result<Self> {
        let closed = points.len() >= 2 && points.first() == points.last();
        let waypoints = Self {
            points,
            closed,
            tolerance,
        };
        waypoints.validate()?;
        Ok(waypoints)
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Validate for Waypoints {
    fn validate(&self) -> Result<()> {
        let count = self.points.len();
        if count < Self::MIN_COUNT {
            return Err(ConstructionError::TooFewWaypoints { count }.into());
        }

        if let Some(index) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(ConstructionError::NonFiniteWaypoint { index }.into());
        }

        for (i, pair) in self.points.windows(2).enumerate() {
            if self.tolerance.points_eq(pair[0].to_array(), pair[1].to_array()) {
                return Err(ConstructionError::DuplicateWaypoint { index: i + 1 }.into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coaster_core::CoasterError;
    use coaster_math::DVec3;

    fn construction(err: CoasterError) -> ConstructionError {
        match err {
            CoasterError::Construction(inner) => inner,
            other => panic!("expected construction error, got {other:?}"),
        }
    }

    #[test]
    fn test_open_and_closed() {
        let open =
            Waypoints::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y], Tolerance::default()).unwrap();
        assert!(!open.is_closed());
        assert_eq!(open.len(), 3);

        let closed = Waypoints::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::ZERO],
            Tolerance::default(),
        )
        .unwrap();
        assert!(closed.is_closed());
    }

    #[test]
    fn test_nearly_closed_is_open() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1e-12, 0.0, 0.0)];
        let waypoints = Waypoints::new(points, Tolerance::default()).unwrap();
        assert!(!waypoints.is_closed());
    }

    #[test]
    fn test_too_few() {
        let err = Waypoints::new(vec![DVec3::ZERO, DVec3::X], Tolerance::default()).unwrap_err();
        assert_eq!(construction(err), ConstructionError::TooFewWaypoints { count: 2 });
    }

    #[test]
    fn test_duplicate_consecutive() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::X, DVec3::Y];
        let err = Waypoints::new(points, Tolerance::default()).unwrap_err();
        assert_eq!(construction(err), ConstructionError::DuplicateWaypoint { index: 2 });
    }

    #[test]
    fn test_non_finite() {
        let points = vec![DVec3::ZERO, DVec3::new(f64::NAN, 0.0, 0.0), DVec3::Y];
        let err = Waypoints::new(points, Tolerance::default()).unwrap_err();
        assert_eq!(construction(err), ConstructionError::NonFiniteWaypoint { index: 1 });
    }
}
