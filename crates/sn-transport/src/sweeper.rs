//! Discrete-ordinates sweep over one group.
//!
//! A single traversal serves 1-D, 2-D and 3-D meshes: cells are visited
//! k-outer, j-middle, i-inner, each axis ascending or descending with the
//! sign of the direction cosine. Face fluxes are carried in one array per
//! axis, indexed like the boundary faces, so the outgoing flux of one cell
//! is the incident flux of the next along the same track.

use sn_angle::Quadrature;
use sn_core::timing::{Timer, sweep_timing};
use sn_geometry::{Axis, Mesh, Side};
use std::sync::Arc;
use tracing::trace;

use crate::boundary::BoundaryManager;
use crate::current_tally::CurrentTally;
use crate::equation::Equation;
use crate::error::{TransportError, TransportResult, ensure_size};
use crate::sweep_source::SweepSource;

pub struct Sweeper {
    mesh: Arc<Mesh>,
    quadrature: Arc<Quadrature>,
    equation: Box<dyn Equation>,
    // Cell indices per axis in ascending and descending order.
    order: [[Vec<usize>; 2]; 3],
    face: [Vec<f64>; 3],
    tally: Option<CurrentTally>,
}

impl Sweeper {
    pub fn new(
        mesh: Arc<Mesh>,
        quadrature: Arc<Quadrature>,
        equation: Box<dyn Equation>,
    ) -> TransportResult<Self> {
        if quadrature.dimension() != mesh.dimension() {
            return Err(TransportError::DimensionMismatch {
                what: "quadrature",
                mesh: mesh.dimension().axes(),
                other: quadrature.dimension().axes(),
            });
        }
        let order = Axis::ALL.map(|axis| {
            let n = mesh.number_cells_axis(axis);
            [(0..n).collect(), (0..n).rev().collect()]
        });
        let face = Axis::ALL.map(|axis| vec![0.0; mesh.face_size(Side::of(axis, true))]);
        Ok(Self {
            mesh,
            quadrature,
            equation,
            order,
            face,
            tally: None,
        })
    }

    /// Record partial currents on every subsequent sweep.
    pub fn set_tally(&mut self, tally: CurrentTally) {
        self.tally = Some(tally);
    }

    pub fn tally(&self) -> Option<&CurrentTally> {
        self.tally.as_ref()
    }

    pub fn take_tally(&mut self) -> Option<CurrentTally> {
        self.tally.take()
    }

    /// Sweep group `g`, overwriting `phi` with the new scalar flux.
    ///
    /// Incident flux comes from `boundary` and outgoing flux is written back
    /// to it. When `psi` is given, the cell-average angular flux of every
    /// angle is stored as `psi[angle_index][cell]`. An attached
    /// [`CurrentTally`] is reset for `g` and refilled.
    pub fn sweep(
        &mut self,
        g: usize,
        source: &mut SweepSource,
        boundary: &mut BoundaryManager,
        phi: &mut [f64],
        mut psi: Option<&mut [Vec<f64>]>,
    ) -> TransportResult<()> {
        ensure_size("group flux moments", self.mesh.number_cells(), phi.len())?;
        if let Some(psi) = psi.as_deref() {
            ensure_size("angular flux angles", self.quadrature.number_angles(), psi.len())?;
        }
        let timer = Timer::start();
        let axes = self.mesh.dimension().axes();
        let nx = self.mesh.number_cells_axis(Axis::X);
        let ny = self.mesh.number_cells_axis(Axis::Y);

        phi.fill(0.0);
        self.equation.setup_group(g);
        if let Some(tally) = self.tally.as_mut() {
            tally.reset(g);
        }

        for o in 0..self.quadrature.number_octants() {
            self.equation.setup_octant(o);
            let signs = self.quadrature.octant_signs(o);
            let dir = signs.map(|s| usize::from(s < 0.0));
            for a in 0..self.quadrature.number_angles_octant() {
                self.equation.setup_angle(a);
                let w = self.quadrature.weight(a);
                let q = source.source(g, o, a);

                for axis in &Axis::ALL[..axes] {
                    let n = axis.index();
                    let incoming = Side::of(*axis, signs[n] > 0.0);
                    self.face[n].copy_from_slice(boundary.incident(incoming, g, o, a));
                    if let Some(tally) = self.tally.as_mut() {
                        let edge = if signs[n] > 0.0 {
                            0
                        } else {
                            self.mesh.number_cells_axis(*axis)
                        };
                        tally.tally_face(*axis, edge, &self.face[n], g, o, a);
                    }
                }

                let mut angular = psi
                    .as_deref_mut()
                    .map(|p| p[self.quadrature.angle_index(o, a)].as_mut_slice());

                let [fx, fy, fz] = &mut self.face;
                for &k in &self.order[2][dir[2]] {
                    for &j in &self.order[1][dir[1]] {
                        for &i in &self.order[0][dir[0]] {
                            let cell = self.mesh.index(i, j, k);
                            let faces = [j + k * ny, i + k * nx, i + j * nx];
                            let psi_in = [
                                fx[faces[0]],
                                if axes > 1 { fy[faces[1]] } else { 0.0 },
                                if axes > 2 { fz[faces[2]] } else { 0.0 },
                            ];
                            let mut psi_out = [0.0; 3];
                            let psi_c = self.equation.solve(
                                cell,
                                [i, j, k],
                                q[cell],
                                &psi_in,
                                &mut psi_out,
                            );
                            fx[faces[0]] = psi_out[0];
                            if axes > 1 {
                                fy[faces[1]] = psi_out[1];
                            }
                            if axes > 2 {
                                fz[faces[2]] = psi_out[2];
                            }
                            if let Some(tally) = self.tally.as_mut() {
                                for (n, axis) in Axis::ALL[..axes].iter().enumerate() {
                                    let mut fine = [i, j, k];
                                    fine[n] += 1 - dir[n];
                                    tally.tally(*axis, fine, g, o, a, psi_out[n]);
                                }
                            }
                            phi[cell] += w * psi_c;
                            if let Some(store) = angular.as_deref_mut() {
                                store[cell] = psi_c;
                            }
                        }
                    }
                }

                for axis in &Axis::ALL[..axes] {
                    let n = axis.index();
                    let leaving = Side::of(*axis, signs[n] < 0.0);
                    boundary
                        .outgoing_mut(leaving, g, o, a)
                        .copy_from_slice(&self.face[n]);
                }
            }
        }

        timer.stop_into(&sweep_timing::SWEEPS);
        trace!("Swept group {}", g);
        Ok(())
    }
}
