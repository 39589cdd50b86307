//! Fission density and group emission.
//!
//! Forward: density = Σ_g νσf_g φ_g and group g receives χ_g × density.
//! Adjoint problems swap the roles of χ and νσf.

use rayon::prelude::*;
use sn_geometry::Mesh;
use sn_material::Material;
use std::sync::Arc;

use crate::error::{TransportError, TransportResult, ensure_size};

#[derive(Debug, Clone)]
pub struct FissionSource {
    mesh: Arc<Mesh>,
    material: Arc<Material>,
    adjoint: bool,
    density: Vec<f64>,
    value: Vec<f64>,
    source: Vec<f64>,
    scale: f64,
}

impl FissionSource {
    pub fn new(mesh: Arc<Mesh>, material: Arc<Material>, adjoint: bool) -> TransportResult<Self> {
        if !material.is_finalized() {
            return Err(TransportError::NotFinalized);
        }
        let n = mesh.number_cells();
        Ok(Self {
            mesh,
            material,
            adjoint,
            density: vec![0.0; n],
            value: vec![0.0; n],
            source: vec![0.0; n],
            scale: 1.0,
        })
    }

    /// Weight of group `g` flux in the density.
    #[inline]
    fn production(&self, m: usize, g: usize) -> f64 {
        if self.adjoint {
            self.material.chi(m, g)
        } else {
            self.material.nu_sigma_f(m, g)
        }
    }

    /// Fraction of the density emitted into group `g`.
    #[inline]
    fn emission(&self, m: usize, g: usize) -> f64 {
        if self.adjoint {
            self.material.nu_sigma_f(m, g)
        } else {
            self.material.chi(m, g)
        }
    }

    /// True when some cell can produce fission neutrons.
    pub fn is_fissile(&self) -> bool {
        (0..self.mesh.number_cells()).any(|cell| {
            let m = self.mesh.material(cell);
            (0..self.material.number_groups()).any(|g| self.production(m, g) > 0.0)
        })
    }

    /// Seed a uniform density over fissile cells, normalized to unit L2 norm.
    pub fn initialize(&mut self) {
        let groups = self.material.number_groups();
        for cell in 0..self.density.len() {
            let m = self.mesh.material(cell);
            let fissile = (0..groups).any(|g| self.production(m, g) > 0.0);
            self.density[cell] = if fissile { 1.0 } else { 0.0 };
        }
        let norm = sn_core::norm_l2(&self.density);
        if norm > 0.0 {
            self.density.iter_mut().for_each(|d| *d /= norm);
        }
        self.scale = 1.0;
        self.value.copy_from_slice(&self.density);
    }

    /// Recompute the density from group flux moments.
    pub fn update(&mut self, phi: &[Vec<f64>]) -> TransportResult<()> {
        ensure_size("fission flux groups", self.material.number_groups(), phi.len())?;
        let this = &*self;
        let density: Vec<f64> = (0..this.density.len())
            .into_par_iter()
            .map(|cell| {
                let m = this.mesh.material(cell);
                phi.iter()
                    .enumerate()
                    .map(|(g, phi_g)| this.production(m, g) * phi_g[cell])
                    .sum()
            })
            .collect();
        self.density = density;
        Ok(())
    }

    /// Fix the scale (typically 1/k) for the coming outer iteration.
    pub fn setup_outer(&mut self, scale: f64) {
        self.scale = scale;
        for (v, d) in self.value.iter_mut().zip(&self.density) {
            *v = scale * d;
        }
    }

    /// Moments source for group `g`: emission × scale × density.
    pub fn source(&mut self, g: usize) -> &[f64] {
        for cell in 0..self.source.len() {
            let m = self.mesh.material(cell);
            self.source[cell] = self.emission(m, g) * self.value[cell];
        }
        &self.source
    }

    pub fn density(&self) -> &[f64] {
        &self.density
    }

    pub fn set_density(&mut self, density: Vec<f64>) -> TransportResult<()> {
        ensure_size("fission density", self.density.len(), density.len())?;
        self.density = density;
        Ok(())
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Volume-weighted L1 norm of the density.
    pub fn total_production(&self) -> f64 {
        self.density
            .iter()
            .enumerate()
            .map(|(cell, d)| self.mesh.volume(cell) * d.abs())
            .sum()
    }
}
