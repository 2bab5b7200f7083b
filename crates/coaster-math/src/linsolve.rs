//! Dense square linear systems with one factorization and many right-hand sides.

use coaster_core::{ConstructionError, Result};
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

/// A factored coefficient matrix, checked for conditioning up front.
pub struct DenseSystem {
    lu: LU<f64, Dyn, Dyn>,
    dim: usize,
    reciprocal_condition: f64,
}

impl DenseSystem {
    /// Default lower bound on the reciprocal condition number.
    pub const DEFAULT_THRESHOLD: f64 = 1e-12;

    /// Factor `matrix`, rejecting it if `σ_min / σ_max < threshold`.
    pub fn new(matrix: DMatrix<f64>, threshold: f64) -> Result<Self> {
        if matrix.nrows() != matrix.ncols() || matrix.is_empty() {
            return Err(ConstructionError::InvalidConfig(format!(
                "coefficient matrix must be square and non-empty, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            ))
            .into());
        }

        let singular_values = matrix.singular_values();
        let largest = singular_values.max();
        let smallest = singular_values.min();
        let reciprocal_condition = if largest > 0.0 { smallest / largest } else { 0.0 };

        if reciprocal_condition.is_nan() || reciprocal_condition < threshold {
            return Err(ConstructionError::SingularSystem { reciprocal_condition }.into());
        }

        Ok(Self {
            dim: matrix.nrows(),
            lu: matrix.lu(),
            reciprocal_condition,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn reciprocal_condition(&self) -> f64 {
        self.reciprocal_condition
    }

    /// Solve `A x = rhs`.
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>> {
        if rhs.len() != self.dim() {
            return Err(ConstructionError::InvalidConfig(format!(
                "right-hand side has {} entries, system has {}",
                rhs.len(),
                self.dim()
            ))
            .into());
        }
        let b = DVector::from_column_slice(rhs);
        let x = self.lu.solve(&b).ok_or(ConstructionError::SingularSystem {
            reciprocal_condition: self.reciprocal_condition,
        })?;
        Ok(x.iter().copied().collect())
    }
}
