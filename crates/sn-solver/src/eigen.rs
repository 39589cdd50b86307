//! Power iteration for the fundamental mode.

use sn_core::norm_l2;
use tracing::{debug, info};

use crate::error::{SolverError, SolverResult};
use crate::mg_solver::MultigroupSolver;
use crate::monitor::{IterationMonitor, MonitorConfig, SolveReport};
use crate::session::TransportSession;

/// Outer iteration on the fission source.
///
/// Each iteration fixes the fission source at `density / k`, solves the
/// multigroup problem and updates `k` by the ratio of volume-weighted
/// fission production. Convergence requires both the normalized density
/// change and the eigenvalue change to fall below the tolerance.
pub struct PowerIteration {
    multigroup: Box<dyn MultigroupSolver>,
    config: MonitorConfig,
    last_multigroup: Option<SolveReport>,
}

impl PowerIteration {
    pub fn new(multigroup: Box<dyn MultigroupSolver>, config: MonitorConfig) -> Self {
        Self {
            multigroup,
            config,
            last_multigroup: None,
        }
    }

    /// Report of the final multigroup solve.
    pub fn last_multigroup(&self) -> Option<&SolveReport> {
        self.last_multigroup.as_ref()
    }

    pub fn solve(&mut self, session: &mut TransportSession) -> SolverResult<SolveReport> {
        if !session.fission.is_fissile() {
            return Err(SolverError::ProblemSetup {
                what: "eigenvalue problem has no fissile material".to_string(),
            });
        }
        if session.has_fixed_source() {
            return Err(SolverError::ProblemSetup {
                what: "eigenvalue problem carries an external source or fixed incident flux"
                    .to_string(),
            });
        }
        session.include_fission = true;
        let result = self.iterate(session);
        session.include_fission = false;
        result
    }

    fn iterate(&mut self, session: &mut TransportSession) -> SolverResult<SolveReport> {
        session.fission.initialize();

        let mut k = 1.0;
        let mut monitor = IterationMonitor::new("power iteration", self.config);
        let mut it = 0;
        loop {
            it += 1;
            let old_density = session.fission.density().to_vec();
            let old_production = session.fission.total_production();
            if old_production <= 0.0 {
                return Err(SolverError::Numeric {
                    what: format!("fission production vanished at iteration {it}"),
                });
            }

            session.fission.setup_outer(1.0 / k);
            let report = self.multigroup.solve(session)?;
            self.last_multigroup = Some(report);
            session.fission.update(session.state.all_phi())?;

            let production = session.fission.total_production();
            let k_new = k * production / old_production;
            let r_density = shape_change(session.fission.density(), &old_density);
            let r = r_density.max((k_new - k).abs());
            k = k_new;
            session.state.set_eigenvalue(k);
            debug!(
                "Power iteration {}: k = {:.10}, density change {:.3e}",
                it, k, r_density
            );
            if monitor.monitor(it, r) {
                break;
            }
        }

        let report = monitor.report();
        info!("Eigenvalue k = {:.10} ({:?})", k, report.status);
        Ok(report)
    }
}

/// L2 distance between two densities after normalizing each to unit norm.
fn shape_change(new: &[f64], old: &[f64]) -> f64 {
    let nn = norm_l2(new);
    let no = norm_l2(old);
    if nn == 0.0 || no == 0.0 {
        return f64::INFINITY;
    }
    new.iter()
        .zip(old)
        .map(|(a, b)| (a / nn - b / no).powi(2))
        .sum::<f64>()
        .sqrt()
}
