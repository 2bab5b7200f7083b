//! Fixed-order numeric integration.

/// Integrate `f` over `[a, b]` with the composite Simpson rule.
///
/// `intervals` must be even and at least 2; odd counts are rounded up.
/// An empty interval integrates to zero without evaluating `f`.
pub fn simpson<F>(f: F, a: f64, b: f64, intervals: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return 0.0;
    }
    let n = intervals.max(2);
    let n = n + n % 2;
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for k in 1..n {
        let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + k as f64 * h);
    }

    sum * h / 3.0
}
