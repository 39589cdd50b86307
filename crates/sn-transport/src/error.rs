//! Error types for sweep assembly.

use thiserror::Error;

/// Contract violations detected while assembling or driving a sweep.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Material data used before finalize()")]
    NotFinalized,

    #[error("Size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Group {group} out of range ({groups} groups)")]
    GroupOutOfRange { group: usize, groups: usize },

    #[error("Mesh is {mesh}-D but {what} is {other}-D")]
    DimensionMismatch {
        what: &'static str,
        mesh: usize,
        other: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type TransportResult<T> = Result<T, TransportError>;

/// `SizeMismatch` unless `actual == expected`.
pub(crate) fn ensure_size(what: &'static str, expected: usize, actual: usize) -> TransportResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransportError::SizeMismatch {
            what,
            expected,
            actual,
        })
    }
}

impl From<sn_material::MaterialError> for TransportError {
    fn from(e: sn_material::MaterialError) -> Self {
        match e {
            sn_material::MaterialError::NotFinalized => TransportError::NotFinalized,
            other => TransportError::Backend {
                message: other.to_string(),
            },
        }
    }
}

impl From<sn_angle::AngleError> for TransportError {
    fn from(e: sn_angle::AngleError) -> Self {
        TransportError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<sn_geometry::GeometryError> for TransportError {
    fn from(e: sn_geometry::GeometryError) -> Self {
        TransportError::Backend {
            message: e.to_string(),
        }
    }
}
