//! Coarse mesh validation.

use crate::error::{GeometryError, GeometryResult};
use crate::mesh::Axis;

/// Edges must be finite and strictly increasing; fine counts must be
/// positive with one entry per coarse region.
pub(crate) fn validate_axis(axis: Axis, edges: &[f64], fine: &[usize]) -> GeometryResult<()> {
    let name = axis.name();
    if edges.len() < 2 {
        return Err(GeometryError::MissingAxis { axis: name });
    }
    for (index, pair) in edges.windows(2).enumerate() {
        if !(pair[0].is_finite() && pair[1].is_finite()) || pair[1] <= pair[0] {
            return Err(GeometryError::NonIncreasingEdges {
                axis: name,
                index: index + 1,
            });
        }
    }
    let regions = edges.len() - 1;
    let valid = fine.iter().filter(|&&n| n > 0).count();
    if fine.len() != regions || valid != regions {
        return Err(GeometryError::BadFineCounts {
            axis: name,
            regions,
            counts: valid,
        });
    }
    Ok(())
}

pub(crate) fn validate_materials(coarse_cells: usize, materials: &[usize]) -> GeometryResult<()> {
    if materials.len() != coarse_cells {
        return Err(GeometryError::MaterialCount {
            expected: coarse_cells,
            actual: materials.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_decreasing_edges() {
        let err = validate_axis(Axis::X, &[0.0, 1.0, 0.5], &[1, 1]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::NonIncreasingEdges {
                axis: "x",
                index: 2
            }
        );
    }

    #[test]
    fn rejects_zero_fine_count() {
        let err = validate_axis(Axis::Y, &[0.0, 1.0, 2.0], &[3, 0]).unwrap_err();
        assert!(matches!(err, GeometryError::BadFineCounts { regions: 2, counts: 1, .. }));
    }

    #[test]
    fn material_count_must_match() {
        assert!(validate_materials(4, &[0, 0, 0, 0]).is_ok());
        assert!(validate_materials(4, &[0]).is_err());
    }
}
