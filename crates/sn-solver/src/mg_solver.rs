//! Multigroup solvers.
//!
//! Groups below the upscatter cutoff receive no scatter from higher groups,
//! so one Gauss-Seidel pass solves them exactly: before the coupled block
//! in forward problems, after it (descending) in adjoint problems. The
//! block itself is iterated to convergence or handed to GMRES.

use sn_core::{Norm, norm_residual};
use tracing::{debug, info};

use crate::error::SolverResult;
use crate::gmres::gmres;
use crate::mg_operator::MultigroupTransportOperator;
use crate::monitor::{IterationMonitor, MonitorConfig, SolveReport};
use crate::operator::LinearOperator;
use crate::session::TransportSession;
use crate::wg_solver::WithinGroupSolver;
use crate::window::GroupWindow;

/// Solves every group of the session state.
pub trait MultigroupSolver {
    fn name(&self) -> &'static str;

    fn solve(&mut self, session: &mut TransportSession) -> SolverResult<SolveReport>;
}

fn solve_outside(
    inner: &mut dyn WithinGroupSolver,
    session: &mut TransportSession,
    window: &GroupWindow,
) -> SolverResult<()> {
    for g in window.outside() {
        inner.solve(session, g)?;
    }
    Ok(())
}

/// Report for an empty coupled block.
fn empty_block(name: &'static str, config: MonitorConfig) -> SolveReport {
    let mut monitor = IterationMonitor::new(name, config);
    monitor.monitor_init(0.0);
    monitor.report()
}

/// Gauss-Seidel over groups with a within-group solver per group.
pub struct GaussSeidel {
    inner: Box<dyn WithinGroupSolver>,
    config: MonitorConfig,
}

impl GaussSeidel {
    pub fn new(inner: Box<dyn WithinGroupSolver>, config: MonitorConfig) -> Self {
        Self { inner, config }
    }
}

impl GaussSeidel {
    fn solve_groups(&mut self, session: &mut TransportSession) -> SolverResult<SolveReport> {
        let groups = session.number_groups();
        let adjoint = session.state.adjoint();
        let window = GroupWindow::new(session.cutoff, groups, adjoint)?;
        let multiply = session.settings.multiply;

        if !adjoint {
            solve_outside(self.inner.as_mut(), session, &window)?;
        }

        let report = if window.is_empty() {
            empty_block(self.name(), self.config)
        } else {
            let mut monitor = IterationMonitor::new(self.name(), self.config);
            let mut previous: Vec<Vec<f64>> = vec![Vec::new(); groups];
            let mut it = 0;
            loop {
                it += 1;
                if multiply {
                    session.fission.update(session.state.all_phi())?;
                    session.fission.setup_outer(1.0);
                }
                for &g in window.groups() {
                    previous[g].clear();
                    previous[g].extend_from_slice(session.state.phi(g));
                }
                for &g in window.groups() {
                    self.inner.solve(session, g)?;
                }
                let r = window
                    .groups()
                    .iter()
                    .map(|&g| norm_residual(session.state.phi(g), &previous[g], Norm::L2).powi(2))
                    .sum::<f64>()
                    .sqrt();
                if monitor.monitor(it, r) {
                    break;
                }
            }
            monitor.report()
        };

        if adjoint {
            solve_outside(self.inner.as_mut(), session, &window)?;
        }
        Ok(report)
    }
}

impl MultigroupSolver for GaussSeidel {
    fn name(&self) -> &'static str {
        "gauss-seidel"
    }

    fn solve(&mut self, session: &mut TransportSession) -> SolverResult<SolveReport> {
        let include = session.include_fission;
        if session.settings.multiply {
            session.include_fission = true;
        }
        let result = self.solve_groups(session);
        session.include_fission = include;
        let report = result?;

        info!(
            "{}: {:?} after {} iterations (residual {:.3e})",
            report.solver, report.status, report.iterations, report.residual
        );
        Ok(report)
    }
}

/// GMRES on the multigroup transport operator for the coupled block.
pub struct MultigroupKrylov {
    outside: Box<dyn WithinGroupSolver>,
    config: MonitorConfig,
    restart: usize,
}

impl MultigroupKrylov {
    /// `outside` solves the groups below the cutoff.
    pub fn new(outside: Box<dyn WithinGroupSolver>, config: MonitorConfig, restart: usize) -> Self {
        Self {
            outside,
            config,
            restart,
        }
    }

    /// Right-hand side: one sweep per window group of its fixed source and
    /// the scatter from already solved groups, from zero reflective
    /// incident flux.
    fn right_hand_side(
        &self,
        session: &mut TransportSession,
        window: &GroupWindow,
        b: &mut [f64],
    ) -> SolverResult<()> {
        let m = session.state.moments_size();
        let nb = session.boundary.psi_size(true);
        let block = m + nb;

        let mut solved = session.state.all_phi().to_vec();
        for &g in window.groups() {
            solved[g].fill(0.0);
        }
        let zero_incident = vec![0.0; nb];

        for (p, &g) in window.groups().iter().enumerate() {
            let (bm, bb) = b[p * block..(p + 1) * block].split_at_mut(m);
            let s = &mut *session;
            s.sweep_source.reset();
            let fission = s.include_fission.then_some(&mut s.fission);
            s.sweep_source.set_fixed(g, fission);
            s.sweep_source.build_total_scatter(g, 0, &solved)?;
            s.boundary.clear(g);
            s.boundary.set(g);
            if nb > 0 {
                s.boundary
                    .set_psi(g, sn_transport::Direction::Incident, true, &zero_incident)?;
            }
            s.sweeper
                .sweep(g, &mut s.sweep_source, &mut s.boundary, bm, None)?;
            if nb > 0 {
                s.boundary.update(g);
                s.boundary
                    .get_psi(g, sn_transport::Direction::Incident, true, bb)?;
            }
        }
        Ok(())
    }
}

impl MultigroupSolver for MultigroupKrylov {
    fn name(&self) -> &'static str {
        "multigroup krylov"
    }

    fn solve(&mut self, session: &mut TransportSession) -> SolverResult<SolveReport> {
        let groups = session.number_groups();
        let adjoint = session.state.adjoint();
        let window = GroupWindow::new(session.cutoff, groups, adjoint)?;
        let multiply = session.settings.multiply;

        if !adjoint {
            solve_outside(self.outside.as_mut(), session, &window)?;
        }

        let report = if window.is_empty() {
            empty_block(self.name(), self.config)
        } else {
            let block = session.state.moments_size() + session.boundary.psi_size(true);
            let mut b = vec![0.0; window.len() * block];
            self.right_hand_side(session, &window, &mut b)?;

            let mut monitor = IterationMonitor::new(self.name(), self.config);
            let report = {
                let mut op = MultigroupTransportOperator::new(session, window.clone())?;
                if multiply {
                    op = op.with_fission(1.0);
                }
                let mut x = vec![0.0; op.size()];
                op.pack(&mut x)?;
                let report = gmres(&mut op, &b, &mut x, self.restart, &mut monitor)?;
                op.unpack(&x)?;
                report
            };
            debug!(
                "{}: {} window groups, {} unknowns",
                self.name(),
                window.len(),
                b.len()
            );
            report
        };

        if adjoint {
            solve_outside(self.outside.as_mut(), session, &window)?;
        }

        if session.state.store_psi() {
            // Fill the angular flux with one sweep per group at the solution.
            let include = session.include_fission;
            if multiply {
                session.fission.update(session.state.all_phi())?;
                session.fission.setup_outer(1.0);
                session.include_fission = true;
            }
            let swept = window.groups().iter().try_for_each(|&g| session.sweep_group(g));
            session.include_fission = include;
            swept?;
        }

        info!(
            "{}: {:?} after {} iterations (residual {:.3e})",
            report.solver, report.status, report.iterations, report.residual
        );
        Ok(report)
    }
}
