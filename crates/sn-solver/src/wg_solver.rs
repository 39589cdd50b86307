//! Within-group solvers.
//!
//! Both solvers take the group's fixed source (fission when included, plus
//! in-scatter from the other groups at the current flux) as given and
//! converge the within-group scatter and reflective boundary coupling.

use sn_core::{DoubleBuffer, Norm, norm_residual};
use sn_transport::Direction;
use tracing::debug;

use crate::error::SolverResult;
use crate::gmres::gmres;
use crate::monitor::{IterationMonitor, MonitorConfig, SolveReport};
use crate::session::TransportSession;
use crate::wg_operator::WithinGroupOperator;

/// Solves one group's transport equation in place in the session state.
pub trait WithinGroupSolver {
    fn name(&self) -> &'static str;

    fn solve(&mut self, session: &mut TransportSession, g: usize) -> SolverResult<SolveReport>;
}

/// Source iteration: sweep, rebuild the scatter source, repeat until the
/// flux change falls below the tolerance.
#[derive(Debug, Clone)]
pub struct SourceIteration {
    config: MonitorConfig,
}

impl SourceIteration {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }
}

impl WithinGroupSolver for SourceIteration {
    fn name(&self) -> &'static str {
        "source iteration"
    }

    fn solve(&mut self, session: &mut TransportSession, g: usize) -> SolverResult<SolveReport> {
        session.set_group_source(g)?;
        session.boundary.set(g);

        let n = session.state.moments_size();
        let mut flux = DoubleBuffer::new(session.state.phi(g).to_vec(), vec![0.0; n]);
        let mut monitor = IterationMonitor::new(self.name(), self.config);

        let mut it = 0;
        loop {
            it += 1;
            let (current, next) = flux.split();
            session
                .sweep_source
                .build_within_group_scatter(g, current)?;
            session.boundary.clear(g);
            let (_, psi) = session.state.phi_and_psi_mut(g);
            session
                .sweeper
                .sweep(g, &mut session.sweep_source, &mut session.boundary, next, psi)?;
            session.boundary.update(g);
            let r = norm_residual(next, current, Norm::L2);
            flux.flip();
            if monitor.monitor(it, r) {
                break;
            }
        }

        session.state.set_phi(g, flux.into_current())?;
        let report = monitor.report();
        debug!(
            "Group {} {}: {} iterations, residual {:.3e}",
            g, report.solver, report.iterations, report.residual
        );
        Ok(report)
    }
}

/// GMRES on the within-group operator.
#[derive(Debug, Clone)]
pub struct WithinGroupGmres {
    config: MonitorConfig,
    restart: usize,
}

impl WithinGroupGmres {
    pub fn new(config: MonitorConfig, restart: usize) -> Self {
        Self { config, restart }
    }
}

impl WithinGroupSolver for WithinGroupGmres {
    fn name(&self) -> &'static str {
        "within-group gmres"
    }

    fn solve(&mut self, session: &mut TransportSession, g: usize) -> SolverResult<SolveReport> {
        let m = session.state.moments_size();
        let nb = session.boundary.psi_size(true);

        let mut x = vec![0.0; m + nb];
        x[..m].copy_from_slice(session.state.phi(g));
        if nb > 0 {
            session
                .boundary
                .get_psi(g, Direction::Incident, true, &mut x[m..])?;
        }

        // Right-hand side: one sweep of the fixed source from zero
        // reflective incident flux.
        let mut b = vec![0.0; m + nb];
        session.set_group_source(g)?;
        session
            .sweep_source
            .build_within_group_scatter(g, &vec![0.0; m])?;
        session.boundary.clear(g);
        session.boundary.set(g);
        if nb > 0 {
            session
                .boundary
                .set_psi(g, Direction::Incident, true, &vec![0.0; nb])?;
        }
        let (bm, bb) = b.split_at_mut(m);
        session
            .sweeper
            .sweep(g, &mut session.sweep_source, &mut session.boundary, bm, None)?;
        if nb > 0 {
            session.boundary.update(g);
            session.boundary.get_psi(g, Direction::Incident, true, bb)?;
        }

        let mut monitor = IterationMonitor::new(self.name(), self.config);
        let report = {
            let mut op = WithinGroupOperator::new(session, g)?;
            gmres(&mut op, &b, &mut x, self.restart, &mut monitor)?
        };

        session.state.phi_mut(g).copy_from_slice(&x[..m]);
        if nb > 0 {
            session
                .boundary
                .set_psi(g, Direction::Incident, true, &x[m..])?;
        }
        session.boundary.set(g);
        if session.state.store_psi() {
            session.sweep_group(g)?;
        }

        debug!(
            "Group {} {}: {} iterations, residual {:.3e}",
            g, report.solver, report.iterations, report.residual
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::IterationStatus;
    use crate::problem::TransportProblem;
    use sn_angle::Quadrature;
    use sn_geometry::{Dimension, Mesh};
    use sn_material::library;
    use sn_transport::{BoundaryCondition, ConstantSource, ExternalSource};
    use std::sync::Arc;

    fn session(condition: BoundaryCondition, store_psi: bool) -> TransportSession {
        let mesh = Arc::new(Mesh::uniform(Dimension::One, 5, 1.0, 0));
        let material = Arc::new(library::one_group(1.0, 0.9, 0.0).unwrap());
        let quad = Arc::new(Quadrature::gauss_legendre(2).unwrap());
        let q: Arc<dyn ExternalSource> =
            Arc::new(ConstantSource::new(Dimension::One, vec![1.0]).unwrap());
        let mut p = TransportProblem::new(mesh, material, quad).with_external(q);
        p.boundary = vec![condition; 2];
        p.settings.store_angular_flux = store_psi;
        TransportSession::new(&p).unwrap()
    }

    fn config(tol: f64) -> MonitorConfig {
        MonitorConfig {
            atol: tol,
            rtol: 0.0,
            max_iterations: 2000,
            divergence_factor: 1e6,
        }
    }

    #[test]
    fn source_iteration_and_gmres_agree() {
        let mut si = session(BoundaryCondition::Vacuum, false);
        let report = SourceIteration::new(config(1e-13))
            .solve(&mut si, 0)
            .unwrap();
        assert_eq!(report.status, IterationStatus::Converged);
        assert!(report.iterations > 10);

        let mut kr = session(BoundaryCondition::Vacuum, false);
        let gm = MonitorConfig {
            atol: 0.0,
            rtol: 1e-13,
            ..config(0.0)
        };
        let report = WithinGroupGmres::new(gm, 20).solve(&mut kr, 0).unwrap();
        assert!(report.converged());

        for (a, b) in si.state().phi(0).iter().zip(kr.state().phi(0)) {
            assert!((a - b).abs() < 1e-10 * a.abs(), "{a} vs {b}");
        }
        // Symmetric slab.
        let phi = si.state().phi(0);
        assert!((phi[0] - phi[4]).abs() < 1e-10);
        assert!(phi[2] > phi[0]);
    }

    #[test]
    fn reflective_gmres_reaches_infinite_medium() {
        let mut s = session(BoundaryCondition::Reflective, true);
        let gm = MonitorConfig {
            atol: 0.0,
            rtol: 1e-12,
            ..config(0.0)
        };
        WithinGroupGmres::new(gm, 10).solve(&mut s, 0).unwrap();
        // q / (σt - σs) = 10
        for v in s.state().phi(0) {
            assert!((v - 10.0).abs() < 1e-8, "{v}");
        }
        let psi = s.state().psi(0).unwrap();
        for angle in psi {
            for v in angle {
                assert!((v - 5.0).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn iteration_cap_is_a_status() {
        let mut s = session(BoundaryCondition::Reflective, false);
        let cfg = MonitorConfig {
            max_iterations: 3,
            ..config(1e-12)
        };
        let report = SourceIteration::new(cfg).solve(&mut s, 0).unwrap();
        assert_eq!(report.status, IterationStatus::MaxIterations);
        assert_eq!(report.iterations, 3);
    }
}
