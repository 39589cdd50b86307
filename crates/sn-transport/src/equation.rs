//! Per-cell closure relations.
//!
//! An [`Equation`] turns incident face fluxes and a cell source into the
//! cell-average angular flux and the outgoing face fluxes. It is prepared
//! in three stages so that per-angle constants are computed once per angle
//! rather than once per cell.

use serde::{Deserialize, Serialize};
use sn_angle::Quadrature;
use sn_geometry::{Axis, Mesh};
use sn_material::Material;
use std::sync::Arc;

use crate::error::{TransportError, TransportResult};

/// Per-cell transport closure.
pub trait Equation: Send + Sync {
    fn setup_group(&mut self, g: usize);
    fn setup_octant(&mut self, o: usize);
    fn setup_angle(&mut self, a: usize);

    /// Solve one cell and return the cell-average angular flux.
    ///
    /// `psi_in` and `psi_out` hold one face value per axis; entries for
    /// axes beyond the mesh dimension are ignored.
    fn solve(
        &self,
        cell: usize,
        ijk: [usize; 3],
        source: f64,
        psi_in: &[f64; 3],
        psi_out: &mut [f64; 3],
    ) -> f64;
}

/// Closure selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationKind {
    #[default]
    DiamondDifference,
    StepDifference,
}

impl EquationKind {
    pub fn build(
        self,
        mesh: Arc<Mesh>,
        material: Arc<Material>,
        quadrature: Arc<Quadrature>,
    ) -> TransportResult<Box<dyn Equation>> {
        if !material.is_finalized() {
            return Err(TransportError::NotFinalized);
        }
        let eq: Box<dyn Equation> = match self {
            EquationKind::DiamondDifference => {
                Box::new(DiamondDifference::new(mesh, material, quadrature))
            }
            EquationKind::StepDifference => {
                Box::new(StepDifference::new(mesh, material, quadrature))
            }
        };
        Ok(eq)
    }
}

/// Streaming coefficients `factor * |Ω_axis| / Δ_axis` for the current angle.
#[derive(Debug, Clone)]
struct Streaming {
    mesh: Arc<Mesh>,
    material: Arc<Material>,
    quadrature: Arc<Quadrature>,
    factor: f64,
    axes: usize,
    group: usize,
    octant: usize,
    coef: [Vec<f64>; 3],
}

impl Streaming {
    fn new(mesh: Arc<Mesh>, material: Arc<Material>, quadrature: Arc<Quadrature>, factor: f64) -> Self {
        let axes = mesh.dimension().axes();
        let coef = Axis::ALL.map(|axis| vec![0.0; mesh.number_cells_axis(axis)]);
        Self {
            mesh,
            material,
            quadrature,
            factor,
            axes,
            group: 0,
            octant: 0,
            coef,
        }
    }

    fn setup_angle(&mut self, a: usize) {
        let dir = self.quadrature.direction(self.octant, a);
        for axis in &Axis::ALL[..self.axes] {
            let n = axis.index();
            let mu = self.factor * dir[n].abs();
            for (c, w) in self.coef[n].iter_mut().zip(self.mesh.widths(*axis)) {
                *c = mu / w;
            }
        }
    }

    /// Cell-average flux from the balance equation.
    #[inline]
    fn balance(&self, cell: usize, ijk: [usize; 3], source: f64, psi_in: &[f64; 3]) -> f64 {
        let m = self.mesh.material(cell);
        let mut num = source;
        let mut den = self.material.sigma_t(m, self.group);
        for n in 0..self.axes {
            let c = self.coef[n][ijk[n]];
            num += c * psi_in[n];
            den += c;
        }
        num / den
    }
}

/// Diamond difference: the cell average is the mean of in and out faces.
#[derive(Debug, Clone)]
pub struct DiamondDifference {
    streaming: Streaming,
}

impl DiamondDifference {
    pub fn new(mesh: Arc<Mesh>, material: Arc<Material>, quadrature: Arc<Quadrature>) -> Self {
        Self {
            streaming: Streaming::new(mesh, material, quadrature, 2.0),
        }
    }
}

impl Equation for DiamondDifference {
    fn setup_group(&mut self, g: usize) {
        self.streaming.group = g;
    }

    fn setup_octant(&mut self, o: usize) {
        self.streaming.octant = o;
    }

    fn setup_angle(&mut self, a: usize) {
        self.streaming.setup_angle(a);
    }

    #[inline]
    fn solve(
        &self,
        cell: usize,
        ijk: [usize; 3],
        source: f64,
        psi_in: &[f64; 3],
        psi_out: &mut [f64; 3],
    ) -> f64 {
        let psi = self.streaming.balance(cell, ijk, source, psi_in);
        for n in 0..self.streaming.axes {
            psi_out[n] = 2.0 * psi - psi_in[n];
        }
        psi
    }
}

/// Step difference: outgoing faces take the cell average.
#[derive(Debug, Clone)]
pub struct StepDifference {
    streaming: Streaming,
}

impl StepDifference {
    pub fn new(mesh: Arc<Mesh>, material: Arc<Material>, quadrature: Arc<Quadrature>) -> Self {
        Self {
            streaming: Streaming::new(mesh, material, quadrature, 1.0),
        }
    }
}

impl Equation for StepDifference {
    fn setup_group(&mut self, g: usize) {
        self.streaming.group = g;
    }

    fn setup_octant(&mut self, o: usize) {
        self.streaming.octant = o;
    }

    fn setup_angle(&mut self, a: usize) {
        self.streaming.setup_angle(a);
    }

    #[inline]
    fn solve(
        &self,
        cell: usize,
        ijk: [usize; 3],
        source: f64,
        psi_in: &[f64; 3],
        psi_out: &mut [f64; 3],
    ) -> f64 {
        let psi = self.streaming.balance(cell, ijk, source, psi_in);
        psi_out[..self.streaming.axes].fill(psi);
        psi
    }
}
