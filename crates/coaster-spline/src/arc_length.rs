//! Cumulative arc length over the segments of a spline.

use rayon::prelude::*;

use crate::segment::BezierSegment;

/// Arc length of one segment sampled at `panels + 1` evenly spaced `t`.
#[derive(Debug, Clone, PartialEq)]
struct SegmentProfile {
    /// `prefix[k]` is the length over `[0, k / panels]`.
    prefix: Vec<f64>,
    /// `ds/dt` at the same nodes.
    speed: Vec<f64>,
}

impl SegmentProfile {
    fn build(segment: &BezierSegment, panels: usize) -> Self {
        let h = 1.0 / panels as f64;
        let mut prefix = Vec::with_capacity(panels + 1);
        prefix.push(0.0);
        let mut total = 0.0;
        for k in 0..panels {
            let a = k as f64 * h;
            let b = if k + 1 == panels { 1.0 } else { a + h };
            total += segment.length_between(a, b, 2);
            prefix.push(total);
        }
        let speed = (0..=panels).map(|k| segment.speed(k as f64 * h)).collect();
        Self { prefix, speed }
    }

    fn panels(&self) -> usize {
        self.prefix.len() - 1
    }

    fn length(&self) -> f64 {
        self.prefix[self.panels()]
    }

    /// Length over `[0, t]` for `t` in `(0, 1)`.
    ///
    /// Between nodes this is a cubic Hermite through the prefix values with
    /// the node speeds as slopes, limited as in Fritsch–Carlson so it never
    /// decreases.
    fn length_to(&self, t: f64) -> f64 {
        let n = self.panels();
        let x = t * n as f64;
        let k = (x.floor() as usize).min(n - 1);
        let x = (x - k as f64).clamp(0.0, 1.0);

        let (p0, p1) = (self.prefix[k], self.prefix[k + 1]);
        let delta = p1 - p0;
        if delta <= 0.0 {
            return p0;
        }

        let h = 1.0 / n as f64;
        let mut m0 = self.speed[k] * h;
        let mut m1 = self.speed[k + 1] * h;
        let (alpha, beta) = (m0 / delta, m1 / delta);
        let radius = alpha * alpha + beta * beta;
        if radius > 9.0 {
            let tau = 3.0 / radius.sqrt();
            m0 *= tau;
            m1 *= tau;
        }

        let x2 = x * x;
        let x3 = x2 * x;
        let h00 = 2.0 * x3 - 3.0 * x2 + 1.0;
        let h10 = x3 - 2.0 * x2 + x;
        let h01 = -2.0 * x3 + 3.0 * x2;
        let h11 = x3 - x2;
        (h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1).clamp(p0, p1)
    }
}

/// Per-segment length profiles and their prefix sums, built once per spline.
///
/// Every segment is split into `intervals` panels, each integrated with a
/// two-interval Simpson rule. `length_at` is continuous and non-decreasing
/// in `t` whenever the speed is non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLengthTable {
    /// `cumulative[i]` is the length from the start to waypoint `i`.
    cumulative: Vec<f64>,
    profiles: Vec<SegmentProfile>,
    intervals: usize,
}

impl ArcLengthTable {
    pub fn build(segments: &[BezierSegment], intervals: usize) -> Self {
        let panels = intervals.max(1);
        let profiles: Vec<SegmentProfile> = segments
            .par_iter()
            .map(|seg| SegmentProfile::build(seg, panels))
            .collect();

        let mut cumulative = Vec::with_capacity(profiles.len() + 1);
        cumulative.push(0.0);
        let mut total = 0.0;
        for profile in &profiles {
            total += profile.length();
            cumulative.push(total);
        }

        Self {
            cumulative,
            profiles,
            intervals: panels,
        }
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Panels per segment.
    pub fn intervals(&self) -> usize {
        self.intervals
    }

    pub fn segment_length(&self, segment: usize) -> f64 {
        self.cumulative[segment + 1] - self.cumulative[segment]
    }

    pub fn segment_lengths(&self) -> impl Iterator<Item = f64> + '_ {
        self.cumulative.windows(2).map(|w| w[1] - w[0])
    }

    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Length from the start of the curve to local `t` of `segment`.
    pub fn length_at(&self, segment: usize, t: f64) -> f64 {
        let base = self.cumulative[segment];
        if t.is_nan() || t <= 0.0 {
            base
        } else if t >= 1.0 {
            self.cumulative[segment + 1]
        } else {
            let end = self.cumulative[segment + 1];
            (base + self.profiles[segment].length_to(t)).min(end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coaster_math::DVec3;

    fn straight(a: DVec3, b: DVec3) -> BezierSegment {
        BezierSegment::new(a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b)
    }

    fn staircase() -> Vec<BezierSegment> {
        vec![
            straight(DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0)),
            straight(DVec3::new(3.0, 0.0, 0.0), DVec3::new(3.0, 4.0, 0.0)),
            straight(DVec3::new(3.0, 4.0, 0.0), DVec3::new(3.0, 4.0, 2.0)),
        ]
    }

    // fast start, nearly stalls near the end
    fn braking() -> BezierSegment {
        BezierSegment::new(
            DVec3::ZERO,
            DVec3::new(10.0, 0.0, 0.0),
            DVec3::new(10.0, 0.001, 0.0),
            DVec3::new(9.9, 0.001, 0.0),
        )
    }

    #[test]
    fn test_prefix_table() {
        let table = ArcLengthTable::build(&staircase(), 10);
        let cum = table.cumulative();
        assert_eq!(cum.len(), 4);
        assert_eq!(cum[0], 0.0);
        assert!((cum[1] - 3.0).abs() < 1e-12);
        assert!((cum[2] - 7.0).abs() < 1e-12);
        assert!((table.total() - 9.0).abs() < 1e-12);
        assert!((table.segment_length(1) - 4.0).abs() < 1e-12);
        let sum: f64 = table.segment_lengths().sum();
        assert!((sum - table.total()).abs() < 1e-12);
    }

    #[test]
    fn test_partial_lengths() {
        let table = ArcLengthTable::build(&staircase(), 10);
        assert!((table.length_at(1, 0.5) - 5.0).abs() < 1e-12);
        assert!((table.length_at(0, 0.37) - 1.11).abs() < 1e-12);
        assert_eq!(table.length_at(2, 0.0), table.cumulative()[2]);
        assert_eq!(table.length_at(2, 1.0), table.total());
    }

    #[test]
    fn test_partial_length_matches_fine_integral() {
        let seg = braking();
        let table = ArcLengthTable::build(&[seg], 10);
        for &t in &[0.05, 0.33, 0.5, 0.71, 0.98] {
            let reference = seg.length_to(t, 2000);
            let relative = (table.length_at(0, t) - reference).abs() / table.total();
            assert!(relative < 1e-3, "t={t}: {relative}");
        }
    }

    #[test]
    fn test_non_decreasing_with_varying_speed() {
        let table = ArcLengthTable::build(&[braking()], 10);
        let mut previous = 0.0;
        for i in 0..=20_000 {
            let s = table.length_at(0, i as f64 / 20_000.0);
            assert!(s >= previous, "length decreased at step {i}");
            previous = s;
        }
    }
}
