//! Fixed external sources.

use sn_angle::angular_norm;
use sn_geometry::Dimension;

use crate::error::{TransportError, TransportResult, ensure_size};

/// An isotropic volumetric source.
pub trait ExternalSource: Send + Sync {
    fn dimension(&self) -> Dimension;
    fn number_groups(&self) -> usize;

    /// Scalar (angle-integrated) strength in `cell` for group `g`.
    fn moment(&self, cell: usize, g: usize) -> f64;

    /// Strength per unit solid angle along angle `a` of octant `o`.
    fn discrete(&self, cell: usize, g: usize, _o: usize, _a: usize) -> f64 {
        self.moment(cell, g) / angular_norm(self.dimension())
    }
}

/// The same group spectrum in every cell.
#[derive(Debug, Clone)]
pub struct ConstantSource {
    dimension: Dimension,
    strength: Vec<f64>,
}

impl ConstantSource {
    pub fn new(dimension: Dimension, strength: Vec<f64>) -> TransportResult<Self> {
        check_spectrum(&strength)?;
        Ok(Self {
            dimension,
            strength,
        })
    }
}

impl ExternalSource for ConstantSource {
    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn number_groups(&self) -> usize {
        self.strength.len()
    }

    fn moment(&self, _cell: usize, g: usize) -> f64 {
        self.strength[g]
    }
}

/// Per-cell source regions, each with its own group spectrum.
#[derive(Debug, Clone)]
pub struct RegionSource {
    dimension: Dimension,
    region_map: Vec<usize>,
    spectra: Vec<Vec<f64>>,
}

impl RegionSource {
    pub fn new(
        dimension: Dimension,
        region_map: Vec<usize>,
        spectra: Vec<Vec<f64>>,
    ) -> TransportResult<Self> {
        let groups = spectra.first().map_or(0, Vec::len);
        for spectrum in &spectra {
            ensure_size("source spectrum", groups, spectrum.len())?;
            check_spectrum(spectrum)?;
        }
        if region_map.iter().any(|&r| r >= spectra.len()) {
            return Err(TransportError::InvalidArg {
                what: "source region id without a spectrum",
            });
        }
        Ok(Self {
            dimension,
            region_map,
            spectra,
        })
    }

    pub fn number_cells(&self) -> usize {
        self.region_map.len()
    }
}

impl ExternalSource for RegionSource {
    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn number_groups(&self) -> usize {
        self.spectra.first().map_or(0, Vec::len)
    }

    fn moment(&self, cell: usize, g: usize) -> f64 {
        self.spectra[self.region_map[cell]][g]
    }
}

fn check_spectrum(strength: &[f64]) -> TransportResult<()> {
    if strength.is_empty() {
        return Err(TransportError::InvalidArg {
            what: "source spectrum is empty",
        });
    }
    if strength.iter().any(|s| !s.is_finite() || *s < 0.0) {
        return Err(TransportError::InvalidArg {
            what: "source strength must be finite and non-negative",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn constant_source_normalization() {
        let q = ConstantSource::new(Dimension::One, vec![1.0, 2.0]).unwrap();
        assert_eq!(q.moment(7, 1), 2.0);
        assert_eq!(q.discrete(7, 1, 1, 0), 1.0);
        let q = ConstantSource::new(Dimension::Three, vec![4.0 * PI]).unwrap();
        assert!((q.discrete(0, 0, 5, 2) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn region_source_lookup() {
        let q = RegionSource::new(
            Dimension::Two,
            vec![0, 1, 1, 0],
            vec![vec![0.0, 0.0], vec![1.0, 0.5]],
        )
        .unwrap();
        assert_eq!(q.number_groups(), 2);
        assert_eq!(q.number_cells(), 4);
        assert_eq!(q.moment(2, 1), 0.5);
        assert_eq!(q.moment(3, 1), 0.0);
    }

    #[test]
    fn invalid_sources() {
        assert!(ConstantSource::new(Dimension::One, vec![]).is_err());
        assert!(ConstantSource::new(Dimension::One, vec![-1.0]).is_err());
        assert!(RegionSource::new(Dimension::One, vec![2], vec![vec![1.0]]).is_err());
        assert!(
            RegionSource::new(Dimension::One, vec![0], vec![vec![1.0], vec![1.0, 2.0]]).is_err()
        );
    }
}
