//! Evenly spaced poses along a spline, for placing rail geometry.
//!
//! Rails are laid at uniform parameter steps (dense where the curve is slow)
//! and ties at uniform arc-length steps. Both exclude the end of the domain,
//! which on a closed curve coincides with the start.

use coaster_core::Result;
use coaster_spline::{FrameKind, FrameTracker, NaturalSpline};
use rayon::prelude::*;

use crate::pose::Pose;

/// `count` poses at `u = u_min + i·(u_max − u_min)/count`.
pub fn sample_by_parameter(
    spline: &NaturalSpline,
    count: usize,
    kind: FrameKind,
) -> Result<Vec<Pose>> {
    let (u_min, u_max) = spline.domain();
    let step = (u_max - u_min) / count.max(1) as f64;
    let params: Vec<(f64, f64)> = (0..count)
        .into_par_iter()
        .map(|i| {
            let u = u_min + step * i as f64;
            (u, spline.length(u))
        })
        .collect();
    poses(spline, &params, kind)
}

/// `count` poses at `s = i·L/count`, inverted back to parameters.
pub fn sample_by_length(
    spline: &NaturalSpline,
    count: usize,
    kind: FrameKind,
) -> Result<Vec<Pose>> {
    let step = spline.total_length() / count.max(1) as f64;
    let params = (0..count)
        .into_par_iter()
        .map(|i| {
            let s = step * i as f64;
            spline.inv_length(s).map(|u| (u, s))
        })
        .collect::<Result<Vec<(f64, f64)>>>()?;
    poses(spline, &params, kind)
}

// Frames depend on their predecessor, so this part stays sequential.
fn poses(spline: &NaturalSpline, params: &[(f64, f64)], kind: FrameKind) -> Result<Vec<Pose>> {
    let mut tracker = FrameTracker::new(kind);
    let poses = params
        .iter()
        .map(|&(u, s)| -> Result<Pose> {
            Ok(Pose {
                u,
                s,
                position: spline.coordinate(u),
                frame: tracker.frame_at(spline, u)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = poses.len(), ?kind, "rail poses sampled");
    Ok(poses)
}
