use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use coaster_math::{DVec3, Point3};
use coaster_motion::rail::{sample_by_length, sample_by_parameter};
use coaster_motion::{Pose, Ride, RideConfig};
use coaster_spline::polyline::{curve_to_polyline, polyline_length};
use coaster_spline::{FrameKind, NaturalSpline, SplineConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coaster", about = "Build a coaster track and move along it")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Waypoints as "x,y,z;x,y,z;..." (defaults to the demo loop)
    #[arg(long, global = true)]
    points: Option<String>,

    /// SplineConfig as JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print track summary
    Info,
    /// Print evenly spaced poses
    Sample {
        #[arg(short, long, default_value = "50")]
        count: usize,
        #[arg(long, value_enum, default_value = "length")]
        by: Spacing,
        #[arg(long, value_enum, default_value = "up")]
        frame: FrameArg,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Simulate the car for a while
    Ride {
        /// Time step in seconds
        #[arg(long, default_value = "0.0166667")]
        dt: f64,
        #[arg(long, default_value = "10")]
        seconds: f64,
        #[arg(long, default_value = "9.8")]
        gravity: f64,
        #[arg(long, value_enum, default_value = "frenet")]
        frame: FrameArg,
        /// Print every n-th step
        #[arg(long, default_value = "10")]
        every: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print an adaptive polyline of the centerline
    Polyline {
        /// Maximum chord deviation
        #[arg(short, long, default_value = "0.01")]
        tolerance: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Spacing {
    Parameter,
    Length,
}

#[derive(Clone, Copy, ValueEnum)]
enum FrameArg {
    Frenet,
    Up,
}

impl From<FrameArg> for FrameKind {
    fn from(arg: FrameArg) -> Self {
        match arg {
            FrameArg::Frenet => FrameKind::Frenet,
            FrameArg::Up => FrameKind::up(),
        }
    }
}

/// The closed demo loop.
fn demo_track() -> Vec<Point3> {
    [
        [0.0, 0.0, 0.0],
        [-1.0, -2.0, 0.0],
        [1.0, -2.0, -1.0],
        [2.0, 2.0, 0.0],
        [1.0, 3.0, 5.0],
        [1.0, 2.0, 5.0],
        [4.0, 1.0, 5.0],
        [4.5, 1.5, 3.0],
        [5.0, 4.0, 1.0],
        [4.5, 6.0, 2.0],
        [4.0, 4.0, 4.0],
        [3.5, 4.0, 1.0],
        [3.0, 6.0, 0.0],
        [1.0, 5.0, -1.0],
        [3.0, 1.0, 0.0],
        [0.0, 0.0, 0.0],
    ]
    .into_iter()
    .map(DVec3::from_array)
    .collect()
}

fn parse_points(text: &str) -> anyhow::Result<Vec<Point3>> {
    text.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .enumerate()
        .map(|(i, item)| -> anyhow::Result<Point3> {
            let coords = item
                .split(',')
                .map(|c| c.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("waypoint {i}: cannot parse {item:?}"))?;
            match coords[..] {
                [x, y, z] => Ok(DVec3::new(x, y, z)),
                _ => bail!("waypoint {i}: expected 3 coordinates, got {}", coords.len()),
            }
        })
        .collect()
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SplineConfig> {
    let Some(path) = path else {
        return Ok(SplineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn fmt_vec(v: DVec3, precision: usize) -> String {
    format!("({:.*}, {:.*}, {:.*})", precision, v.x, precision, v.y, precision, v.z)
}

fn print_pose(pose: &Pose) {
    println!(
        "u={:.4} s={:.4} pos={} fwd={} up={}",
        pose.u,
        pose.s,
        fmt_vec(pose.position, 4),
        fmt_vec(pose.frame.forward, 3),
        fmt_vec(pose.frame.up, 3)
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let points = match &cli.points {
        Some(text) => parse_points(text)?,
        None => demo_track(),
    };
    let config = load_config(cli.config.as_ref())?;
    let spline = NaturalSpline::with_config(points, config).context("building spline")?;
    tracing::info!(
        waypoints = spline.waypoints().len(),
        closed = spline.is_closed(),
        "track ready"
    );

    match cli.command {
        Commands::Info => {
            println!("coaster v{}", env!("CARGO_PKG_VERSION"));
            println!("waypoints: {}", spline.waypoints().len());
            println!("segments: {}", spline.segment_count());
            println!("closed: {}", spline.is_closed());
            println!("total length: {:.6}", spline.total_length());
            println!("max height: {:.6}", spline.max_height());
            for (i, s) in spline.cumulative_lengths().iter().enumerate() {
                println!("  waypoint {i:>3}: s={s:.6}");
            }
        }
        Commands::Sample { count, by, frame, json } => {
            let kind = FrameKind::from(frame);
            let poses = match by {
                Spacing::Parameter => sample_by_parameter(&spline, count, kind)?,
                Spacing::Length => sample_by_length(&spline, count, kind)?,
            };
            for pose in &poses {
                if json {
                    println!("{}", serde_json::to_string(pose)?);
                } else {
                    print_pose(pose);
                }
            }
        }
        Commands::Ride {
            dt,
            seconds,
            gravity,
            frame,
            every,
            json,
        } => {
            if !(dt.is_finite() && dt > 0.0) {
                bail!("--dt must be positive, got {dt}");
            }
            let config = RideConfig {
                gravity,
                frame: frame.into(),
            };
            let mut ride = Ride::new(Arc::new(spline), config)?;
            let steps = (seconds / dt).ceil().max(0.0) as usize;
            let every = every.max(1);

            for step in 0..steps {
                let sample = ride.advance(dt)?;
                if step % every == 0 || sample.finished {
                    if json {
                        println!("{}", serde_json::to_string(&sample)?);
                    } else {
                        let t = (step + 1) as f64 * dt;
                        print!("t={:.3} v={:.3} lap={} ", t, sample.speed, sample.lap);
                        print_pose(&sample.pose);
                    }
                }
                if sample.finished {
                    tracing::info!(step, "ride finished");
                    break;
                }
            }
        }
        Commands::Polyline { tolerance } => {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                bail!("--tolerance must be positive, got {tolerance}");
            }
            let points = curve_to_polyline(&spline, tolerance, spline.segment_count());
            tracing::info!(
                points = points.len(),
                length = polyline_length(&points),
                "polyline built"
            );
            for p in points {
                println!("{} {} {}", p.x, p.y, p.z);
            }
        }
    }

    Ok(())
}
