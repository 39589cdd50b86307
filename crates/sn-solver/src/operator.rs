//! Matrix-free linear operator contract.

use crate::error::SolverResult;

/// A square linear operator applied as `y = A x`.
///
/// Applying may update scratch state held by the operator, so `apply`
/// takes `&mut self` and calls must not overlap.
pub trait LinearOperator {
    /// Number of rows (and columns).
    fn size(&self) -> usize;

    /// Apply the operator: y = A * x.
    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> SolverResult<()>;
}

/// Dense operator backed by a nalgebra matrix.
#[derive(Debug, Clone)]
pub struct DenseOperator {
    matrix: nalgebra::DMatrix<f64>,
}

impl DenseOperator {
    pub fn new(matrix: nalgebra::DMatrix<f64>) -> Self {
        Self { matrix }
    }
}

impl LinearOperator for DenseOperator {
    fn size(&self) -> usize {
        self.matrix.nrows()
    }

    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> SolverResult<()> {
        crate::error::ensure_size("operator input", self.matrix.ncols(), x.len())?;
        crate::error::ensure_size("operator output", self.matrix.nrows(), y.len())?;
        let yv = &self.matrix * nalgebra::DVector::from_column_slice(x);
        y.copy_from_slice(yv.as_slice());
        Ok(())
    }
}
