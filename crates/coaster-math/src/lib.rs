pub mod aabb;
pub mod linsolve;
pub mod quadrature;

pub use glam::{DAffine3, DMat3, DVec3};
pub use aabb::{Aabb3, Axis};
pub use linsolve::DenseSystem;
pub use quadrature::simpson;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
