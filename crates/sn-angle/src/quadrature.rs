//! Quadrature sets and octant conventions.
//!
//! Octants are numbered so that 2-D octant `o` and 3-D octant `o + 4` share
//! the same (μ, η) signs:
//!
//! | octant | μ | η | ξ |
//! |---|---|---|---|
//! | 0 | + | + | + |
//! | 1 | − | + | + |
//! | 2 | − | − | + |
//! | 3 | + | − | + |
//! | 4..8 | as 0..4 | | − |
//!
//! In 1-D, octant 0 is +μ and octant 1 is −μ.

use serde::{Deserialize, Serialize};
use sn_geometry::{Axis, Dimension};
use std::f64::consts::PI;

use crate::error::{AngleError, AngleResult};
use crate::legendre;

const SIGNS_XY: [[f64; 2]; 4] = [[1.0, 1.0], [-1.0, 1.0], [-1.0, -1.0], [1.0, -1.0]];

/// Total quadrature weight over the sphere: 2 in slab geometry, 4π otherwise.
pub fn angular_norm(dimension: Dimension) -> f64 {
    match dimension {
        Dimension::One => 2.0,
        Dimension::Two | Dimension::Three => 4.0 * PI,
    }
}

/// Declarative choice of quadrature set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuadratureSpec {
    GaussLegendre { angles: usize },
    Product { azimuths: usize, polars: usize },
}

impl QuadratureSpec {
    pub fn build(&self, dimension: Dimension) -> AngleResult<Quadrature> {
        match *self {
            QuadratureSpec::GaussLegendre { angles } => {
                if dimension != Dimension::One {
                    return Err(AngleError::Dimension {
                        set: "Gauss-Legendre",
                        dimension: dimension.axes(),
                    });
                }
                Quadrature::gauss_legendre(angles)
            }
            QuadratureSpec::Product { azimuths, polars } => {
                Quadrature::product(azimuths, polars, dimension)
            }
        }
    }
}

/// A symmetric discrete-ordinates set.
#[derive(Debug, Clone)]
pub struct Quadrature {
    dimension: Dimension,
    mu: Vec<f64>,
    eta: Vec<f64>,
    xi: Vec<f64>,
    weights: Vec<f64>,
}

impl Quadrature {
    /// Slab Gauss-Legendre set with `angles` directions per half-space.
    pub fn gauss_legendre(angles: usize) -> AngleResult<Self> {
        if angles == 0 {
            return Err(AngleError::Empty { what: "angle" });
        }
        let (mu, weights) = legendre::positive_half(angles)?;
        Ok(Self {
            dimension: Dimension::One,
            eta: vec![0.0; angles],
            xi: vec![0.0; angles],
            mu,
            weights,
        })
    }

    /// Chebyshev azimuth by Gauss-Legendre polar product set.
    pub fn product(azimuths: usize, polars: usize, dimension: Dimension) -> AngleResult<Self> {
        if dimension == Dimension::One {
            return Err(AngleError::Dimension {
                set: "Product",
                dimension: 1,
            });
        }
        if azimuths == 0 {
            return Err(AngleError::Empty { what: "azimuth" });
        }
        if polars == 0 {
            return Err(AngleError::Empty { what: "polar angle" });
        }
        let (cos_theta, polar_weights) = legendre::positive_half(polars)?;
        // Octants cover the sphere 8 times in 3-D but only 4 times in 2-D.
        let scale = match dimension {
            Dimension::Three => 0.5 * PI / azimuths as f64,
            _ => PI / azimuths as f64,
        };
        let n = azimuths * polars;
        let mut quad = Self {
            dimension,
            mu: Vec::with_capacity(n),
            eta: Vec::with_capacity(n),
            xi: Vec::with_capacity(n),
            weights: Vec::with_capacity(n),
        };
        for m in 0..azimuths {
            let phi = (2.0 * m as f64 + 1.0) * PI / (4.0 * azimuths as f64);
            for (&c, &w) in cos_theta.iter().zip(&polar_weights) {
                let s = (1.0 - c * c).sqrt();
                quad.mu.push(s * phi.cos());
                quad.eta.push(s * phi.sin());
                quad.xi.push(c);
                quad.weights.push(w * scale);
            }
        }
        Ok(quad)
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn number_octants(&self) -> usize {
        self.dimension.number_octants()
    }

    pub fn number_angles_octant(&self) -> usize {
        self.weights.len()
    }

    pub fn number_angles(&self) -> usize {
        self.number_octants() * self.weights.len()
    }

    /// Flat index of angle `a` in octant `o`.
    pub fn angle_index(&self, o: usize, a: usize) -> usize {
        o * self.weights.len() + a
    }

    pub fn weight(&self, a: usize) -> f64 {
        self.weights[a]
    }

    /// Direction-cosine signs of an octant.
    pub fn octant_signs(&self, o: usize) -> [f64; 3] {
        match self.dimension {
            Dimension::One => [if o == 0 { 1.0 } else { -1.0 }, 1.0, 1.0],
            Dimension::Two => [SIGNS_XY[o][0], SIGNS_XY[o][1], 1.0],
            Dimension::Three => [
                SIGNS_XY[o % 4][0],
                SIGNS_XY[o % 4][1],
                if o < 4 { 1.0 } else { -1.0 },
            ],
        }
    }

    /// Octant whose signs match `signs` on the active axes.
    pub fn octant_of(&self, signs: [f64; 3]) -> usize {
        (0..self.number_octants())
            .find(|&o| {
                let s = self.octant_signs(o);
                (0..self.dimension.axes()).all(|a| s[a] == signs[a])
            })
            .unwrap_or(0)
    }

    /// Signed direction cosines (μ, η, ξ) of angle `a` in octant `o`.
    pub fn direction(&self, o: usize, a: usize) -> [f64; 3] {
        let s = self.octant_signs(o);
        [s[0] * self.mu[a], s[1] * self.eta[a], s[2] * self.xi[a]]
    }

    /// Octant holding the specular reflection of octant `o` across a plane
    /// normal to `axis`. The angle index within the octant is unchanged.
    pub fn reflect(&self, o: usize, axis: Axis) -> usize {
        let mut s = self.octant_signs(o);
        s[axis.index()] = -s[axis.index()];
        self.octant_of(s)
    }

    /// Octants whose directions have the given sign along `axis`.
    pub fn octants_along(&self, axis: Axis, positive: bool) -> Vec<usize> {
        (0..self.number_octants())
            .filter(|&o| (self.octant_signs(o)[axis.index()] > 0.0) == positive)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_weight(q: &Quadrature) -> f64 {
        q.number_octants() as f64 * (0..q.number_angles_octant()).map(|a| q.weight(a)).sum::<f64>()
    }

    #[test]
    fn weights_sum_to_angular_norm() {
        let gl = Quadrature::gauss_legendre(4).unwrap();
        assert!((total_weight(&gl) - 2.0).abs() < 1e-13);
        for dim in [Dimension::Two, Dimension::Three] {
            let q = Quadrature::product(3, 2, dim).unwrap();
            assert!((total_weight(&q) - angular_norm(dim)).abs() < 1e-12);
        }
    }

    #[test]
    fn directions_are_unit_vectors_in_3d() {
        let q = Quadrature::product(2, 3, Dimension::Three).unwrap();
        for o in 0..q.number_octants() {
            for a in 0..q.number_angles_octant() {
                let d = q.direction(o, a);
                let len = d.iter().map(|c| c * c).sum::<f64>();
                assert!((len - 1.0).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn octant_sign_table() {
        let q = Quadrature::product(1, 1, Dimension::Three).unwrap();
        assert_eq!(q.octant_signs(1), [-1.0, 1.0, 1.0]);
        assert_eq!(q.octant_signs(3), [1.0, -1.0, 1.0]);
        assert_eq!(q.octant_signs(6), [-1.0, -1.0, -1.0]);
    }

    #[test]
    fn reflection_flips_one_axis() {
        let q = Quadrature::product(2, 1, Dimension::Two).unwrap();
        assert_eq!(q.reflect(0, Axis::X), 1);
        assert_eq!(q.reflect(0, Axis::Y), 3);
        assert_eq!(q.reflect(2, Axis::X), 3);
        let q3 = Quadrature::product(1, 1, Dimension::Three).unwrap();
        assert_eq!(q3.reflect(1, Axis::Z), 5);
        let slab = Quadrature::gauss_legendre(2).unwrap();
        assert_eq!(slab.reflect(0, Axis::X), 1);
        for o in 0..q3.number_octants() {
            for axis in Axis::ALL {
                assert_eq!(q3.reflect(q3.reflect(o, axis), axis), o);
            }
        }
    }

    #[test]
    fn spec_dimension_checks() {
        let spec = QuadratureSpec::GaussLegendre { angles: 2 };
        assert!(spec.build(Dimension::Two).is_err());
        let spec = QuadratureSpec::Product {
            azimuths: 2,
            polars: 1,
        };
        assert!(spec.build(Dimension::One).is_err());
        assert_eq!(spec.build(Dimension::Two).unwrap().number_angles(), 8);
    }
}
