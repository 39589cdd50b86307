//! Within-group transport operator.
//!
//! Unknowns are one group's flux moments followed by its reflective
//! incident boundary flux. `apply` returns `x - T x` where `T` sweeps the
//! within-group scatter source of `x` with homogeneous non-reflective
//! boundaries and no external source.

use sn_core::timing::{Timer, sweep_timing};
use sn_transport::Direction;

use crate::error::{SolverError, SolverResult, ensure_size};
use crate::operator::LinearOperator;
use crate::session::TransportSession;

pub struct WithinGroupOperator<'a> {
    session: &'a mut TransportSession,
    group: usize,
    moments_size: usize,
    boundary_size: usize,
    swept: Vec<f64>,
    incident: Vec<f64>,
}

impl<'a> WithinGroupOperator<'a> {
    pub fn new(session: &'a mut TransportSession, group: usize) -> SolverResult<Self> {
        let groups = session.number_groups();
        if group >= groups {
            return Err(SolverError::ProblemSetup {
                what: format!("group {group} out of range for {groups} groups"),
            });
        }
        let moments_size = session.state.moments_size();
        let boundary_size = session.boundary.psi_size(true);
        Ok(Self {
            session,
            group,
            moments_size,
            boundary_size,
            swept: vec![0.0; moments_size],
            incident: vec![0.0; boundary_size],
        })
    }

    pub fn group(&self) -> usize {
        self.group
    }
}

impl LinearOperator for WithinGroupOperator<'_> {
    fn size(&self) -> usize {
        self.moments_size + self.boundary_size
    }

    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> SolverResult<()> {
        ensure_size("within-group operator input", self.size(), x.len())?;
        ensure_size("within-group operator output", self.size(), y.len())?;
        let timer = Timer::start();
        let g = self.group;
        let (xm, xb) = x.split_at(self.moments_size);
        let (ym, yb) = y.split_at_mut(self.moments_size);
        let s = &mut *self.session;

        s.sweep_source.reset();
        s.sweep_source.build_within_group_scatter(g, xm)?;
        s.boundary.clear(g);
        s.boundary.homogenize(g);
        if self.boundary_size > 0 {
            s.boundary.set_psi(g, Direction::Incident, true, xb)?;
        }

        s.sweep_source.set_external_enabled(false);
        let swept = s
            .sweeper
            .sweep(g, &mut s.sweep_source, &mut s.boundary, &mut self.swept, None);
        s.sweep_source.set_external_enabled(true);
        swept?;

        for ((yi, xi), si) in ym.iter_mut().zip(xm).zip(&self.swept) {
            *yi = xi - si;
        }
        if self.boundary_size > 0 {
            s.boundary.update(g);
            s.boundary
                .get_psi(g, Direction::Incident, true, &mut self.incident)?;
            for ((yi, xi), ii) in yb.iter_mut().zip(xb).zip(&self.incident) {
                *yi = xi - ii;
            }
        }

        timer.stop_into(&sweep_timing::OPERATOR_APPLIES);
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

    #[test]
    fn reflective_boundary_block_reaches_fixed_point() {
        let mesh = Arc::new(Mesh::uniform(Dimension::One, 3, 1.0, 0));
        let material = Arc::new(library::one_group(1.0, 0.5, 0.0).unwrap());
        let quad = Arc::new(Quadrature::gauss_legendre(2).unwrap());
        let mut p = TransportProblem::new(mesh, material, quad);
        p.boundary = vec![BoundaryCondition::Reflective; 2];
        let mut s = TransportSession::new(&p).unwrap();

        let mut op = WithinGroupOperator::new(&mut s, 0).unwrap();
        assert_eq!(op.size(), 3 + 4);
        // phi = 1 scatters 0.5 / 2 = 0.25 per unit angle; an incident 0.25
        // sweeps to a flat psi = 0.25, so phi comes back as 0.5.
        let mut x = vec![1.0; 3];
        x.extend([0.25; 4]);
        let mut y = vec![0.0; 7];
        op.apply(&x, &mut y).unwrap();
        for yi in &y[..3] {
            assert!((yi - 0.5).abs() < 1e-13);
        }
        for yi in &y[3..] {
            assert!((yi - 0.0).abs() < 1e-13);
        }
    }

    #[test]
    fn group_out_of_range_is_rejected() {
        let mesh = Arc::new(Mesh::uniform(Dimension::One, 3, 1.0, 0));
        let material = Arc::new(library::one_group(1.0, 0.5, 0.0).unwrap());
        let quad = Arc::new(Quadrature::gauss_legendre(2).unwrap());
        let p = TransportProblem::new(mesh, material, quad);
        let mut s = TransportSession::new(&p).unwrap();
        assert!(WithinGroupOperator::new(&mut s, 1).is_err());
    }
}
