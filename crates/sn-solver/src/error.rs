//! Error types for solver operations.

use sn_transport::TransportError;
use thiserror::Error;

/// Errors that can occur while assembling or running a transport solve.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    #[error("Size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

pub(crate) fn ensure_size(what: &'static str, expected: usize, actual: usize) -> SolverResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SolverError::SizeMismatch {
            what,
            expected,
            actual,
        })
    }
}

impl From<sn_material::MaterialError> for SolverError {
    fn from(e: sn_material::MaterialError) -> Self {
        SolverError::ProblemSetup {
            what: e.to_string(),
        }
    }
}

impl From<sn_angle::AngleError> for SolverError {
    fn from(e: sn_angle::AngleError) -> Self {
        SolverError::ProblemSetup {
            what: e.to_string(),
        }
    }
}

impl From<sn_geometry::GeometryError> for SolverError {
    fn from(e: sn_geometry::GeometryError) -> Self {
        SolverError::ProblemSetup {
            what: e.to_string(),
        }
    }
}
