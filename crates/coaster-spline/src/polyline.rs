//! Curve to polyline conversion for export and plotting.

use coaster_math::Point3;

use crate::curve::Curve;

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

/// Convert a curve to a polyline using adaptive subdivision.
///
/// The domain is first cut into `spans` equal pieces (one per segment is a
/// good choice for a spline). Each piece is halved recursively while its
/// midpoint lies farther than `tolerance` from the chord.
pub fn curve_to_polyline(curve: &dyn Curve, tolerance: f64, spans: usize) -> Vec<Point3> {
    let (t_min, t_max) = curve.domain();
    let spans = spans.max(1);
    let step = (t_max - t_min) / spans as f64;

    let mut points = vec![curve.point_at(t_min)];
    for i in 0..spans {
        let t0 = t_min + step * i as f64;
        let t1 = if i + 1 == spans { t_max } else { t0 + step };
        subdivide(curve, t0, t1, tolerance, &mut points, 0);
    }
    points
}

fn subdivide(
    curve: &dyn Curve,
    t0: f64,
    t1: f64,
    tolerance: f64,
    points: &mut Vec<Point3>,
    depth: u32,
) {
    let p1 = curve.point_at(t1);
    if depth >= MAX_DEPTH {
        points.push(p1);
        return;
    }

    let t_mid = (t0 + t1) * 0.5;
    let p0 = curve.point_at(t0);
    let p_mid = curve.point_at(t_mid);

    // Chord midpoint
    let deviation = (p_mid - (p0 + p1) * 0.5).length();

    if deviation > tolerance {
        subdivide(curve, t0, t_mid, tolerance, points, depth + 1);
        subdivide(curve, t_mid, t1, tolerance, points, depth + 1);
    } else {
        points.push(p1);
    }
}

/// Sum of the chord lengths.
pub fn polyline_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
