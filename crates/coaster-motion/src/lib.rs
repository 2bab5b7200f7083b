//! Things that move along a coaster spline: rail placement and the ride.

pub mod pose;
pub mod rail;
pub mod ride;

pub use pose::Pose;
pub use ride::{Ride, RideConfig, RideSample};
