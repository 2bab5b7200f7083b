use crate::error::Result;

/// Validate structural integrity of curve input or settings.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
