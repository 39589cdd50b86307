//! Isotropic sweep source for one group.
//!
//! Two moment accumulators are kept: a fixed part (fission and, for
//! Gauss-Seidel, in-scatter from other groups) and a scatter part rebuilt
//! every inner iteration. The discrete source handed to the sweeper is
//! `(fixed + scatter) / angular_norm` plus the discrete external source
//! while that is enabled.

use sn_angle::{Quadrature, angular_norm};
use sn_geometry::Mesh;
use sn_material::Material;
use std::sync::Arc;

use crate::error::{TransportError, TransportResult, ensure_size};
use crate::external_source::ExternalSource;
use crate::fission_source::FissionSource;

pub struct SweepSource {
    mesh: Arc<Mesh>,
    material: Arc<Material>,
    external: Option<Arc<dyn ExternalSource>>,
    adjoint: bool,
    norm: f64,
    // Source groups that can scatter into each group, inclusive.
    bounds: Vec<(usize, usize)>,
    fixed: Vec<f64>,
    scatter: Vec<f64>,
    discrete: Vec<f64>,
    external_enabled: bool,
}

impl SweepSource {
    pub fn new(
        mesh: Arc<Mesh>,
        material: Arc<Material>,
        quadrature: &Quadrature,
        external: Option<Arc<dyn ExternalSource>>,
        adjoint: bool,
    ) -> TransportResult<Self> {
        if !material.is_finalized() {
            return Err(TransportError::NotFinalized);
        }
        let dim = mesh.dimension();
        if quadrature.dimension() != dim {
            return Err(TransportError::DimensionMismatch {
                what: "quadrature",
                mesh: dim.axes(),
                other: quadrature.dimension().axes(),
            });
        }
        let groups = material.number_groups();
        if let Some(q) = &external {
            ensure_size("external source groups", groups, q.number_groups())?;
            if q.dimension() != dim {
                return Err(TransportError::DimensionMismatch {
                    what: "external source",
                    mesh: dim.axes(),
                    other: q.dimension().axes(),
                });
            }
        }

        let bounds = if adjoint {
            // Transposed scattering: g receives from every gp that g feeds.
            (0..groups)
                .map(|g| {
                    let feeds = |gp: &usize| material.lower(*gp) <= g && g <= material.upper(*gp);
                    let lo = (0..groups).find(feeds).unwrap_or(g);
                    let hi = (0..groups).rev().find(feeds).unwrap_or(g);
                    (lo, hi)
                })
                .collect()
        } else {
            (0..groups)
                .map(|g| (material.lower(g), material.upper(g)))
                .collect()
        };

        let n = mesh.number_cells();
        Ok(Self {
            norm: angular_norm(dim),
            mesh,
            material,
            external,
            adjoint,
            bounds,
            fixed: vec![0.0; n],
            scatter: vec![0.0; n],
            discrete: vec![0.0; n],
            external_enabled: true,
        })
    }

    pub fn adjoint(&self) -> bool {
        self.adjoint
    }

    /// σs(m, g ← gp), transposed for adjoint problems.
    #[inline]
    fn sigma_s(&self, m: usize, g: usize, gp: usize) -> f64 {
        if self.adjoint {
            self.material.sigma_s(m, gp, g)
        } else {
            self.material.sigma_s(m, g, gp)
        }
    }

    /// Zero both moment accumulators.
    pub fn reset(&mut self) {
        self.fixed.fill(0.0);
        self.scatter.fill(0.0);
    }

    /// Fixed source for group `g`: fission emission when a fission source
    /// is given. The external source enters through the discrete source.
    pub fn set_fixed(&mut self, g: usize, fission: Option<&mut FissionSource>) {
        match fission {
            Some(fs) => self.fixed.copy_from_slice(fs.source(g)),
            None => self.fixed.fill(0.0),
        }
    }

    /// Fixed source plus in-scatter from every other group at the current
    /// flux, as used by Gauss-Seidel.
    pub fn set_fixed_with_scatter(
        &mut self,
        g: usize,
        phi: &[Vec<f64>],
        fission: Option<&mut FissionSource>,
    ) -> TransportResult<()> {
        self.check_phi(phi)?;
        self.set_fixed(g, fission);
        let (lo, hi) = self.bounds[g];
        for gp in lo..=hi {
            if gp == g {
                continue;
            }
            for cell in 0..self.fixed.len() {
                let m = self.mesh.material(cell);
                self.fixed[cell] += self.sigma_s(m, g, gp) * phi[gp][cell];
            }
        }
        Ok(())
    }

    /// Within-group scatter from `phi_g` only.
    pub fn build_within_group_scatter(&mut self, g: usize, phi_g: &[f64]) -> TransportResult<()> {
        ensure_size("group flux moments", self.scatter.len(), phi_g.len())?;
        for cell in 0..self.scatter.len() {
            let m = self.mesh.material(cell);
            self.scatter[cell] = self.sigma_s(m, g, g) * phi_g[cell];
        }
        Ok(())
    }

    /// Accumulate scatter into `g` from every group at or above `cutoff`,
    /// summed in ascending source-group order.
    pub fn build_total_scatter(
        &mut self,
        g: usize,
        cutoff: usize,
        phi: &[Vec<f64>],
    ) -> TransportResult<()> {
        self.check_phi(phi)?;
        let (lo, hi) = self.bounds[g];
        for gp in lo.max(cutoff)..=hi {
            for cell in 0..self.scatter.len() {
                let m = self.mesh.material(cell);
                self.scatter[cell] += self.sigma_s(m, g, gp) * phi[gp][cell];
            }
        }
        Ok(())
    }

    /// Accumulate fission emission into `g` from groups at or above
    /// `cutoff`, scaled by `scale`.
    pub fn build_total_fission(
        &mut self,
        g: usize,
        cutoff: usize,
        phi: &[Vec<f64>],
        scale: f64,
    ) -> TransportResult<()> {
        self.check_phi(phi)?;
        let groups = phi.len();
        for cell in 0..self.scatter.len() {
            let m = self.mesh.material(cell);
            let (emit, density) = if self.adjoint {
                let d: f64 = (cutoff..groups)
                    .map(|gp| self.material.chi(m, gp) * phi[gp][cell])
                    .sum();
                (self.material.nu_sigma_f(m, g), d)
            } else {
                let d: f64 = (cutoff..groups)
                    .map(|gp| self.material.nu_sigma_f(m, gp) * phi[gp][cell])
                    .sum();
                (self.material.chi(m, g), d)
            };
            self.scatter[cell] += scale * emit * density;
        }
        Ok(())
    }

    pub fn set_external_enabled(&mut self, enabled: bool) {
        self.external_enabled = enabled;
    }

    pub fn external_enabled(&self) -> bool {
        self.external_enabled
    }

    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Discrete source for angle `a` of octant `o`, one value per cell.
    pub fn source(&mut self, g: usize, o: usize, a: usize) -> &[f64] {
        let inv = 1.0 / self.norm;
        for cell in 0..self.discrete.len() {
            self.discrete[cell] = (self.fixed[cell] + self.scatter[cell]) * inv;
        }
        if self.external_enabled {
            if let Some(q) = &self.external {
                for (cell, s) in self.discrete.iter_mut().enumerate() {
                    *s += q.discrete(cell, g, o, a);
                }
            }
        }
        &self.discrete
    }

    /// Current moments source, fixed plus scatter.
    pub fn moments(&self) -> Vec<f64> {
        self.fixed
            .iter()
            .zip(&self.scatter)
            .map(|(f, s)| f + s)
            .collect()
    }

    fn check_phi(&self, phi: &[Vec<f64>]) -> TransportResult<()> {
        ensure_size("flux groups", self.material.number_groups(), phi.len())?;
        for phi_g in phi {
            ensure_size("group flux moments", self.scatter.len(), phi_g.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_source::ConstantSource;
    use sn_geometry::Dimension;
    use sn_material::library;

    fn uo2(adjoint: bool, external: bool) -> SweepSource {
        let mesh = Arc::new(Mesh::uniform(Dimension::One, 3, 1.0, 0));
        let mat = Arc::new(library::c5g7_uo2().unwrap());
        let quad = Quadrature::gauss_legendre(1).unwrap();
        let q: Option<Arc<dyn ExternalSource>> = external
            .then(|| Arc::new(ConstantSource::new(Dimension::One, vec![1.0; 7]).unwrap()) as _);
        SweepSource::new(mesh, mat, &quad, q, adjoint).unwrap()
    }

    #[test]
    fn external_only_source_is_normalized() {
        let mut ss = uo2(false, true);
        ss.reset();
        assert_eq!(ss.source(2, 0, 0), &[0.5; 3]);
        ss.set_external_enabled(false);
        assert_eq!(ss.source(2, 0, 0), &[0.0; 3]);
    }

    #[test]
    fn total_scatter_respects_cutoff() {
        let mut ss = uo2(false, false);
        let phi = vec![vec![1.0; 3]; 7];
        ss.reset();
        ss.build_total_scatter(3, 0, &phi).unwrap();
        let all = ss.moments()[0];
        let expected = 5.51630e-09 + 3.14270e-09 + 2.67920e-03 + 4.52565e-01 + 1.25250e-04;
        assert!((all - expected).abs() < 1e-15);

        ss.reset();
        ss.build_total_scatter(3, 4, &phi).unwrap();
        assert!((ss.moments()[1] - 1.25250e-04).abs() < 1e-18);
    }

    #[test]
    fn adjoint_scatter_is_transposed() {
        let mut ss = uo2(true, false);
        let phi = vec![vec![1.0; 3]; 7];
        ss.reset();
        ss.build_total_scatter(3, 0, &phi).unwrap();
        // Adjoint group 3 gathers from the groups that group 3 feeds.
        let expected = 4.52565e-01 + 5.56640e-03;
        assert!((ss.moments()[2] - expected).abs() < 1e-15);
    }

    #[test]
    fn gauss_seidel_source_excludes_self_scatter() {
        let mut ss = uo2(false, false);
        let mut phi = vec![vec![0.0; 3]; 7];
        phi[1] = vec![2.0; 3];
        phi[2] = vec![5.0; 3];
        ss.set_fixed_with_scatter(2, &phi, None).unwrap();
        assert!((ss.moments()[0] - 2.0 * 1.63140e-03).abs() < 1e-16);
    }

    #[test]
    fn fission_into_window_groups() {
        let mut ss = uo2(false, false);
        let mut phi = vec![vec![0.0; 3]; 7];
        phi[0] = vec![1.0; 3];
        phi[6] = vec![1.0; 3];
        ss.reset();
        ss.build_total_fission(0, 1, &phi, 0.5).unwrap();
        let expected = 0.5 * 5.87819e-01 * 5.257105352e-01;
        assert!((ss.moments()[0] - expected).abs() < 1e-15);
    }

    #[test]
    fn rejects_wrong_shapes() {
        let mut ss = uo2(false, false);
        assert!(ss.build_total_scatter(0, 0, &[vec![1.0; 3]]).is_err());
        assert!(ss.build_within_group_scatter(0, &[1.0]).is_err());
    }
}
