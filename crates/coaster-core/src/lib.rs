pub mod error;
pub mod tolerance;
pub mod traits;

pub use error::{CoasterError, ConstructionError, Degeneracy, DomainWarning, Result};
pub use tolerance::Tolerance;
