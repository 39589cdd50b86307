//! Geometry-specific error types.

pub type GeometryResult<T> = Result<T, GeometryError>;

/// Mesh construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// An axis needed by the dimension was never given edges.
    MissingAxis { axis: &'static str },

    /// Coarse edges must be strictly increasing.
    NonIncreasingEdges { axis: &'static str, index: usize },

    /// Fine counts must match the number of coarse regions and be positive.
    BadFineCounts { axis: &'static str, regions: usize, counts: usize },

    /// Material ids must cover every coarse region.
    MaterialCount { expected: usize, actual: usize },

    /// An axis was given for a dimension that does not have it.
    UnusedAxis { axis: &'static str },
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::MissingAxis { axis } => {
                write!(f, "No edges given for axis {}", axis)
            }
            GeometryError::NonIncreasingEdges { axis, index } => {
                write!(
                    f,
                    "Coarse edges on axis {} are not strictly increasing at index {}",
                    axis, index
                )
            }
            GeometryError::BadFineCounts {
                axis,
                regions,
                counts,
            } => {
                write!(
                    f,
                    "Axis {} has {} coarse regions but {} valid fine counts",
                    axis, regions, counts
                )
            }
            GeometryError::MaterialCount { expected, actual } => {
                write!(
                    f,
                    "Expected {} coarse material ids, got {}",
                    expected, actual
                )
            }
            GeometryError::UnusedAxis { axis } => {
                write!(f, "Axis {} is not part of this mesh dimension", axis)
            }
        }
    }
}

impl std::error::Error for GeometryError {}
