//! Partial currents through coarse-mesh surfaces.
//!
//! A coarse mesh groups `level` fine cells per coarse cell along every
//! active axis; the last coarse cell on an axis takes any remainder. Each
//! coarse surface normal to an axis keeps two partial currents, one per
//! sense, integrated over the surface:
//!
//! J± = Σ_faces A_face Σ_{angles, ±Ω·n > 0} w |Ω·n| ψ_face
//!
//! The sweeper feeds outgoing cell-face fluxes and incident boundary
//! fluxes, so the difference of the two senses on a closed coarse cell is
//! its net leakage.

use sn_angle::Quadrature;
use sn_geometry::{Axis, Mesh};
use std::sync::Arc;

use crate::error::{TransportError, TransportResult};

pub struct CurrentTally {
    mesh: Arc<Mesh>,
    quadrature: Arc<Quadrature>,
    number_groups: usize,
    // Coarse cells per axis.
    coarse: [usize; 3],
    // Fine edge -> coarse edge, `None` for edges interior to a coarse cell.
    edge: [Vec<Option<usize>>; 3],
    // Fine cell -> coarse cell.
    cell: [Vec<usize>; 3],
    // [axis * groups + g][sense], sense 1 is positive.
    current: Vec<[Vec<f64>; 2]>,
}

impl CurrentTally {
    pub fn new(
        mesh: Arc<Mesh>,
        quadrature: Arc<Quadrature>,
        number_groups: usize,
        level: usize,
    ) -> TransportResult<Self> {
        if level == 0 {
            return Err(TransportError::InvalidArg {
                what: "coarse mesh level must be positive",
            });
        }
        if number_groups == 0 {
            return Err(TransportError::InvalidArg {
                what: "tally needs at least one group",
            });
        }
        if quadrature.dimension() != mesh.dimension() {
            return Err(TransportError::DimensionMismatch {
                what: "quadrature",
                mesh: mesh.dimension().axes(),
                other: quadrature.dimension().axes(),
            });
        }
        let axes = mesh.dimension().axes();
        let mut coarse = [1; 3];
        let mut edge: [Vec<Option<usize>>; 3] = Default::default();
        let mut cell: [Vec<usize>; 3] = Default::default();
        for axis in Axis::ALL {
            let d = axis.index();
            let n = mesh.number_cells_axis(axis);
            let step = if d < axes { level } else { n };
            coarse[d] = n.div_ceil(step);
            cell[d] = (0..n).map(|i| (i / step).min(coarse[d] - 1)).collect();
            edge[d] = (0..=n)
                .map(|e| match e {
                    e if e == n => Some(coarse[d]),
                    e if e % step == 0 => Some(e / step),
                    _ => None,
                })
                .collect();
        }
        let current = Axis::ALL
            .iter()
            .flat_map(|&axis| {
                let size = surfaces(coarse, axis);
                (0..number_groups).map(move |_| [vec![0.0; size], vec![0.0; size]])
            })
            .collect();
        Ok(Self {
            mesh,
            quadrature,
            number_groups,
            coarse,
            edge,
            cell,
            current,
        })
    }

    pub fn number_groups(&self) -> usize {
        self.number_groups
    }

    /// Coarse cells along `axis`.
    pub fn number_coarse(&self, axis: Axis) -> usize {
        self.coarse[axis.index()]
    }

    /// Zero every partial current of group `g`.
    pub fn reset(&mut self, g: usize) {
        for axis in Axis::ALL {
            for sense in &mut self.current[axis.index() * self.number_groups + g] {
                sense.fill(0.0);
            }
        }
    }

    /// Add the face flux `psi` leaving (or entering) across the fine edge
    /// `fine[axis]`; the other entries of `fine` are cell indices. Edges
    /// interior to a coarse cell are ignored.
    pub fn tally(&mut self, axis: Axis, fine: [usize; 3], g: usize, o: usize, a: usize, psi: f64) {
        let d = axis.index();
        let Some(coarse_edge) = self.edge[d][fine[d]] else {
            return;
        };
        let mut at = [0; 3];
        let mut area = 1.0;
        for other in Axis::ALL {
            let p = other.index();
            if p == d {
                at[p] = coarse_edge;
            } else {
                at[p] = self.cell[p][fine[p]];
                area *= self.mesh.width(other, fine[p]);
            }
        }
        let mu = self.quadrature.direction(o, a)[d];
        let index = surface_index(self.coarse, axis, at);
        self.current[d * self.number_groups + g][usize::from(mu > 0.0)][index] +=
            self.quadrature.weight(a) * mu.abs() * area * psi;
    }

    /// Tally a whole boundary face array (laid out like the boundary
    /// faces) sitting on fine edge `edge` of `axis`.
    pub fn tally_face(
        &mut self,
        axis: Axis,
        edge: usize,
        face: &[f64],
        g: usize,
        o: usize,
        a: usize,
    ) {
        let d = axis.index();
        let [p, q] = match axis {
            Axis::X => [1, 2],
            Axis::Y => [0, 2],
            Axis::Z => [0, 1],
        };
        let np = self.cell[p].len();
        for (f, &psi) in face.iter().enumerate() {
            let mut fine = [0; 3];
            fine[d] = edge;
            fine[p] = f % np;
            fine[q] = f / np;
            self.tally(axis, fine, g, o, a, psi);
        }
    }

    /// Partial current of group `g` through the coarse surface at coarse
    /// edge `at[axis]`, coarse cells `at` on the other axes.
    pub fn partial_current(&self, axis: Axis, at: [usize; 3], g: usize, positive: bool) -> f64 {
        let d = axis.index();
        self.current[d * self.number_groups + g][usize::from(positive)]
            [surface_index(self.coarse, axis, at)]
    }

    /// Net current out of coarse cell `at` in group `g`.
    pub fn net_leakage_cell(&self, at: [usize; 3], g: usize) -> f64 {
        let axes = self.mesh.dimension().axes();
        Axis::ALL[..axes]
            .iter()
            .map(|&axis| {
                let d = axis.index();
                let mut high = at;
                high[d] += 1;
                let out_high = self.partial_current(axis, high, g, true)
                    - self.partial_current(axis, high, g, false);
                let out_low = self.partial_current(axis, at, g, false)
                    - self.partial_current(axis, at, g, true);
                out_high + out_low
            })
            .sum()
    }

    /// Net current out of the whole mesh in group `g`.
    pub fn net_leakage(&self, g: usize) -> f64 {
        let [cx, cy, cz] = self.coarse;
        let mut total = 0.0;
        for k in 0..cz {
            for j in 0..cy {
                for i in 0..cx {
                    total += self.net_leakage_cell([i, j, k], g);
                }
            }
        }
        total
    }
}

// Surfaces normal to `axis`: one more coarse edge than cells along it.
fn surfaces(coarse: [usize; 3], axis: Axis) -> usize {
    let mut n = coarse;
    n[axis.index()] += 1;
    n.iter().product()
}

fn surface_index(coarse: [usize; 3], axis: Axis, at: [usize; 3]) -> usize {
    let mut n = coarse;
    n[axis.index()] += 1;
    at[0] + at[1] * n[0] + at[2] * n[0] * n[1]
}
