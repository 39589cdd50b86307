//! Multigroup transport operator for Krylov solvers.
//!
//! Unknowns are packed group by group in window order. Each block holds
//! the group's flux moments followed by its reflective incident boundary
//! flux (only when some side is reflective). Only the incident half of a
//! reflective pair is an unknown; the outgoing half follows by reflection.
//!
//! `apply` returns `(I - T) x`, where `T` sweeps the scatter (and, for
//! multiplying problems, fission) source built from `x`. Groups outside
//! the window keep their current flux, and the external source and
//! non-reflective incident flux are excluded so the map is linear.

use sn_core::timing::{Timer, sweep_timing};
use sn_transport::Direction;
use std::ops::Range;
use tracing::trace;

use crate::error::{SolverError, SolverResult, ensure_size};
use crate::operator::LinearOperator;
use crate::session::TransportSession;
use crate::window::GroupWindow;

pub struct MultigroupTransportOperator<'a> {
    session: &'a mut TransportSession,
    window: GroupWindow,
    moments_size: usize,
    boundary_size: usize,
    multiply: bool,
    scale: f64,
    // Flux snapshot: current flux outside the window, input inside it.
    phi: Vec<Vec<f64>>,
    swept: Vec<f64>,
    incident: Vec<f64>,
}

impl<'a> MultigroupTransportOperator<'a> {
    pub fn new(session: &'a mut TransportSession, window: GroupWindow) -> SolverResult<Self> {
        let groups = session.number_groups();
        if window.number_groups() != groups {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "group window spans {} groups, session has {}",
                    window.number_groups(),
                    groups
                ),
            });
        }
        if window.adjoint() != session.state.adjoint() {
            return Err(SolverError::ProblemSetup {
                what: "group window and session disagree on adjoint mode".to_string(),
            });
        }
        let moments_size = session.state.moments_size();
        let boundary_size = session.boundary.psi_size(true);
        Ok(Self {
            phi: session.state.all_phi().to_vec(),
            swept: vec![0.0; moments_size],
            incident: vec![0.0; boundary_size],
            session,
            window,
            moments_size,
            boundary_size,
            multiply: false,
            scale: 1.0,
        })
    }

    /// Include fission from window groups, scaled by `scale`, in the
    /// operator.
    pub fn with_fission(mut self, scale: f64) -> Self {
        self.multiply = true;
        self.scale = scale;
        self
    }

    pub fn window(&self) -> &GroupWindow {
        &self.window
    }

    /// Unknowns per group.
    pub fn block_size(&self) -> usize {
        self.moments_size + self.boundary_size
    }

    fn block(&self, position: usize) -> (Range<usize>, Range<usize>) {
        let start = position * self.block_size();
        let mid = start + self.moments_size;
        (start..mid, mid..mid + self.boundary_size)
    }

    /// Pack the session's current window flux and reflective incident flux.
    pub fn pack(&self, x: &mut [f64]) -> SolverResult<()> {
        ensure_size("multigroup operator vector", self.size(), x.len())?;
        for (p, &g) in self.window.groups().iter().enumerate() {
            let (m, b) = self.block(p);
            x[m].copy_from_slice(self.session.state.phi(g));
            if self.boundary_size > 0 {
                self.session
                    .boundary
                    .get_psi(g, Direction::Incident, true, &mut x[b])?;
            }
        }
        Ok(())
    }

    /// Write a packed vector back to the session's flux and reflective
    /// incident flux, then restore the boundary conditions.
    pub fn unpack(&mut self, x: &[f64]) -> SolverResult<()> {
        ensure_size("multigroup operator vector", self.size(), x.len())?;
        for (p, &g) in self.window.groups().iter().enumerate() {
            let (m, b) = self.block(p);
            self.session.state.phi_mut(g).copy_from_slice(&x[m]);
            if self.boundary_size > 0 {
                self.session
                    .boundary
                    .set_psi(g, Direction::Incident, true, &x[b])?;
            }
            self.session.boundary.set(g);
        }
        Ok(())
    }

    fn apply_group(&mut self, g: usize, x: &[f64], y: &mut [f64], position: usize) -> SolverResult<()> {
        let (m, b) = self.block(position);
        let cutoff = self.window.cutoff();
        let s = &mut *self.session;

        s.boundary.clear(g);
        s.boundary.homogenize(g);
        if self.boundary_size > 0 {
            s.boundary.set_psi(g, Direction::Incident, true, &x[b.clone()])?;
        }

        s.sweep_source.reset();
        s.sweep_source.build_total_scatter(g, cutoff, &self.phi)?;
        if self.multiply {
            s.sweep_source
                .build_total_fission(g, cutoff, &self.phi, self.scale)?;
        }

        self.swept.copy_from_slice(&self.phi[g]);
        s.sweep_source.set_external_enabled(false);
        let swept = s
            .sweeper
            .sweep(g, &mut s.sweep_source, &mut s.boundary, &mut self.swept, None);
        s.sweep_source.set_external_enabled(true);
        swept?;

        for ((yi, xi), si) in y[m.clone()].iter_mut().zip(&x[m]).zip(&self.swept) {
            *yi = xi - si;
        }

        if self.boundary_size > 0 {
            s.boundary.update(g);
            s.boundary
                .get_psi(g, Direction::Incident, true, &mut self.incident)?;
            for ((yi, xi), ii) in y[b.clone()].iter_mut().zip(&x[b]).zip(&self.incident) {
                *yi = xi - ii;
            }
        }
        Ok(())
    }
}

impl LinearOperator for MultigroupTransportOperator<'_> {
    fn size(&self) -> usize {
        self.window.len() * self.block_size()
    }

    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> SolverResult<()> {
        ensure_size("multigroup operator input", self.size(), x.len())?;
        ensure_size("multigroup operator output", self.size(), y.len())?;
        let timer = Timer::start();

        for (g, phi_g) in self.phi.iter_mut().enumerate() {
            phi_g.copy_from_slice(self.session.state.phi(g));
        }
        for (p, &g) in self.window.groups().iter().enumerate() {
            let (m, _) = self.block(p);
            self.phi[g].copy_from_slice(&x[m]);
        }

        for p in 0..self.window.len() {
            let g = self.window.groups()[p];
            self.apply_group(g, x, y, p)?;
        }

        timer.stop_into(&sweep_timing::OPERATOR_APPLIES);
        trace!("Applied multigroup operator over {} groups", self.window.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::TransportProblem;
    use sn_angle::Quadrature;
    use sn_geometry::{Dimension, Mesh};
    use sn_material::library;
    use sn_transport::BoundaryCondition;
    use std::sync::Arc;

    fn session(conditions: BoundaryCondition, adjoint: bool) -> TransportSession {
        let mesh = Arc::new(Mesh::uniform(Dimension::One, 4, 0.5, 0));
        let material = Arc::new(library::c5g7_uo2().unwrap());
        let quad = Arc::new(Quadrature::gauss_legendre(2).unwrap());
        let mut p = TransportProblem::new(mesh, material, quad);
        p.boundary = vec![conditions; 2];
        p.settings.adjoint = adjoint;
        TransportSession::new(&p).unwrap()
    }

    #[test]
    fn sizes_follow_layout() {
        let mut s = session(BoundaryCondition::Reflective, false);
        let w = GroupWindow::new(3, 7, false).unwrap();
        let op = MultigroupTransportOperator::new(&mut s, w).unwrap();
        // 4 cells plus 2 sides x 2 incident angles x 1 face
        assert_eq!(op.block_size(), 8);
        assert_eq!(op.size(), 32);

        let mut s = session(BoundaryCondition::Vacuum, false);
        let w = GroupWindow::new(3, 7, false).unwrap();
        let op = MultigroupTransportOperator::new(&mut s, w).unwrap();
        assert_eq!(op.size(), 16);
    }

    #[test]
    fn rejects_mismatched_window() {
        let mut s = session(BoundaryCondition::Vacuum, false);
        let w = GroupWindow::new(0, 3, false).unwrap();
        assert!(MultigroupTransportOperator::new(&mut s, w).is_err());

        let w = GroupWindow::new(3, 7, true).unwrap();
        assert!(MultigroupTransportOperator::new(&mut s, w).is_err());
    }

    #[test]
    fn apply_is_linear_and_leaves_flux_untouched() {
        let mut s = session(BoundaryCondition::Reflective, false);
        for g in 0..7 {
            s.state_mut().phi_mut(g).fill(0.1 * (g + 1) as f64);
        }
        let before = s.state().all_phi().to_vec();
        let w = GroupWindow::new(3, 7, false).unwrap();
        let mut op = MultigroupTransportOperator::new(&mut s, w).unwrap();
        let n = op.size();

        let x1: Vec<f64> = (0..n).map(|i| 1.0 + 0.01 * i as f64).collect();
        let x2: Vec<f64> = (0..n).map(|i| 0.5 - 0.003 * i as f64).collect();
        let sum: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 2.0 * a + b).collect();
        let (mut y1, mut y2, mut ys) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
        op.apply(&x1, &mut y1).unwrap();
        op.apply(&x2, &mut y2).unwrap();
        op.apply(&sum, &mut ys).unwrap();
        for i in 0..n {
            assert!((ys[i] - (2.0 * y1[i] + y2[i])).abs() < 1e-12);
        }

        let mut again = vec![0.0; n];
        op.apply(&x1, &mut again).unwrap();
        assert_eq!(again, y1);
        drop(op);
        assert_eq!(s.state().all_phi(), before.as_slice());
    }

    #[test]
    fn pack_unpack_round_trip() {
        let mut s = session(BoundaryCondition::Reflective, true);
        let w = GroupWindow::new(3, 7, true).unwrap();
        let mut op = MultigroupTransportOperator::new(&mut s, w).unwrap();
        let n = op.size();
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        op.unpack(&x).unwrap();
        let mut back = vec![0.0; n];
        op.pack(&mut back).unwrap();
        assert_eq!(back, x);
        drop(op);
        // Group 6 leads the adjoint window.
        assert_eq!(s.state().phi(6), &[0.0, 1.0, 2.0, 3.0]);
    }
}
