use std::sync::Arc;

use approx::assert_relative_eq;
use coaster_core::CoasterError;
use coaster_math::{DVec3, Point3};
use coaster_motion::rail::{sample_by_length, sample_by_parameter};
use coaster_motion::{Ride, RideConfig};
use coaster_spline::{FrameKind, NaturalSpline};

fn dvec3(x: f64, y: f64, z: f64) -> Point3 {
    DVec3::new(x, y, z)
}

fn open_square() -> Vec<Point3> {
    vec![
        dvec3(0.0, 0.0, 0.0),
        dvec3(1.0, 0.0, 0.0),
        dvec3(1.0, 1.0, 0.0),
        dvec3(0.0, 1.0, 0.0),
    ]
}

fn closed_square() -> Arc<NaturalSpline> {
    let mut points = open_square();
    points.push(points[0]);
    Arc::new(NaturalSpline::new(points).unwrap())
}

fn drop_track() -> Arc<NaturalSpline> {
    Arc::new(
        NaturalSpline::new(vec![
            dvec3(0.0, 0.0, 3.0),
            dvec3(2.0, 0.0, 1.0),
            dvec3(4.0, 1.0, 1.5),
            dvec3(6.0, 0.0, 0.0),
        ])
        .unwrap(),
    )
}

#[test]
fn test_closed_ride_completes_laps() {
    let spline = closed_square();
    let total = spline.total_length();
    let mut ride = Ride::new(Arc::clone(&spline), RideConfig::default()).unwrap();

    let mut steps = 0;
    let mut previous_s = 0.0;
    while ride.lap() == 0 {
        let sample = ride.advance(0.05).unwrap();
        assert!(!sample.finished);
        assert!(sample.pose.s < total);
        if sample.lap == 0 {
            assert!(sample.pose.s > previous_s);
        }
        previous_s = sample.pose.s;
        steps += 1;
        assert!(steps < 10_000, "ride never completed a lap");
    }

    // flat track: constant speed from the height margin
    let v = (2.0 * 9.8 * 0.05_f64).sqrt();
    let expected_steps = (total / (v * 0.05)).ceil() as usize;
    assert!((steps as i64 - expected_steps as i64).abs() <= 1);
    assert!(ride.s() < total);
}

#[test]
fn test_large_step_counts_several_laps() {
    let spline = closed_square();
    let total = spline.total_length();
    let mut ride = Ride::new(Arc::clone(&spline), RideConfig::default()).unwrap();
    let v = (2.0 * 9.8 * 0.05_f64).sqrt();
    let sample = ride.advance(100.0).unwrap();
    let expected_laps = (v * 100.0 / total).floor() as u64;
    assert_eq!(sample.lap, expected_laps);
    assert!(sample.pose.s >= 0.0 && sample.pose.s < total);
}

#[test]
fn test_open_ride_stops_at_end() {
    let spline = drop_track();
    let mut ride = Ride::new(Arc::clone(&spline), RideConfig::default()).unwrap();
    let mut previous_s = 0.0;
    for _ in 0..10_000 {
        let sample = ride.advance(0.02).unwrap();
        assert!(sample.pose.s >= previous_s);
        previous_s = sample.pose.s;
        if sample.finished {
            break;
        }
    }
    assert!(ride.is_finished());
    let (_, u_max) = spline.domain();
    assert_eq!(ride.u(), u_max);
    assert_eq!(ride.s(), spline.total_length());

    let after = ride.advance(1.0).unwrap();
    assert!(after.finished);
    assert_eq!(after.pose.u, u_max);
    assert_eq!(after.lap, 0);
}

#[test]
fn test_speed_follows_height() {
    let spline = drop_track();
    let mut ride = Ride::new(Arc::clone(&spline), RideConfig::default()).unwrap();
    for _ in 0..50 {
        let sample = ride.advance(0.01).unwrap();
        let expected = (2.0 * 9.8 * (spline.max_height() - sample.pose.position.z)).sqrt();
        assert_relative_eq!(sample.speed, expected, epsilon = 1e-9);
    }
}

#[test]
fn test_zero_step_stays_put() {
    let spline = drop_track();
    let mut ride = Ride::new(spline, RideConfig::default()).unwrap();
    let sample = ride.advance(0.0).unwrap();
    assert_eq!(sample.pose.u, 0.0);
    assert_eq!(sample.pose.s, 0.0);
    assert_eq!(sample.pose.position, dvec3(0.0, 0.0, 3.0));
    assert!(sample.speed > 0.0);
}

#[test]
fn test_invalid_inputs() {
    let spline = drop_track();
    let config = RideConfig {
        gravity: -9.8,
        ..RideConfig::default()
    };
    match Ride::new(Arc::clone(&spline), config).unwrap_err() {
        CoasterError::InvalidGravity { g } => assert_eq!(g, -9.8),
        other => panic!("unexpected {other:?}"),
    }

    let mut ride = Ride::new(spline, RideConfig::default()).unwrap();
    assert_eq!(
        ride.advance(-0.1).unwrap_err(),
        CoasterError::InvalidTimeStep { dt: -0.1 }
    );
    assert!(ride.advance(f64::NAN).is_err());
}

#[test]
fn test_reset_returns_to_start() {
    let mut ride = Ride::new(closed_square(), RideConfig::default()).unwrap();
    for _ in 0..20 {
        ride.advance(0.1).unwrap();
    }
    assert!(ride.s() > 0.0);
    ride.reset();
    assert_eq!(ride.s(), 0.0);
    assert_eq!(ride.u(), 0.0);
    assert_eq!(ride.lap(), 0);
    let sample = ride.current().unwrap();
    assert_eq!(sample.pose.position, DVec3::ZERO);
}

#[test]
fn test_frenet_ride_starts_on_natural_end() {
    let spline = Arc::new(NaturalSpline::new(open_square()).unwrap());
    let config = RideConfig {
        frame: FrameKind::Frenet,
        ..RideConfig::default()
    };
    let mut ride = Ride::new(spline, config).unwrap();
    let start = ride.current().unwrap();
    assert!(start.pose.frame.is_orthonormal(1e-9));
    for _ in 0..30 {
        let sample = ride.advance(0.05).unwrap();
        assert!(sample.pose.frame.is_orthonormal(1e-9));
    }
}

#[test]
fn test_ride_config_json() {
    let config: RideConfig =
        serde_json::from_str(r#"{ "gravity": 1.62, "frame": { "kind": "frenet" } }"#).unwrap();
    assert_eq!(config.gravity, 1.62);
    assert_eq!(config.frame, FrameKind::Frenet);

    let config: RideConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, RideConfig::default());
}

#[test]
fn test_rail_by_parameter() {
    let spline = NaturalSpline::new(open_square()).unwrap();
    let poses = sample_by_parameter(&spline, 12, FrameKind::up()).unwrap();
    assert_eq!(poses.len(), 12);
    assert_eq!(poses[0].u, 0.0);
    assert_eq!(poses[0].position, DVec3::ZERO);
    for (i, pose) in poses.iter().enumerate() {
        assert!((pose.u - i as f64 * 0.25).abs() < 1e-12);
        assert_eq!(pose.s, spline.length(pose.u));
        assert!(pose.frame.is_orthonormal(1e-9));
    }
    assert!(sample_by_parameter(&spline, 0, FrameKind::up()).unwrap().is_empty());
}

#[test]
fn test_rail_by_length_is_even() {
    let spline = closed_square();
    let count = 10;
    let poses = sample_by_length(&spline, count, FrameKind::Frenet).unwrap();
    assert_eq!(poses.len(), count);

    let step = spline.total_length() / count as f64;
    let threshold = spline.config().inverter.threshold;
    for (i, pose) in poses.iter().enumerate() {
        assert_relative_eq!(pose.s, step * i as f64, epsilon = 1e-12);
        assert!((spline.length(pose.u) - pose.s).abs() <= threshold);
        assert!(pose.frame.is_orthonormal(1e-9));
    }
    for pair in poses.windows(2) {
        assert!(pair[1].u > pair[0].u);
    }
}

#[test]
fn test_rail_on_vertical_line_fails() {
    let spline = NaturalSpline::new(vec![DVec3::ZERO, DVec3::Z, DVec3::Z * 2.0]).unwrap();
    let err = sample_by_parameter(&spline, 4, FrameKind::Frenet).unwrap_err();
    assert!(matches!(err, CoasterError::DegenerateFrame { .. }));
}
