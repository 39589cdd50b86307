//! Iteration monitoring shared by every solver loop.
//!
//! The monitor is the single authority on when a loop stops. Hitting the
//! iteration cap or diverging is a status, not an error.

use serde::Serialize;
use tracing::{debug, info, warn};

/// Why an iteration stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationStatus {
    Converged,
    MaxIterations,
    Diverged,
}

/// Outcome of one solve.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolveReport {
    pub solver: &'static str,
    pub iterations: usize,
    pub residual: f64,
    pub status: IterationStatus,
}

impl SolveReport {
    pub fn converged(&self) -> bool {
        self.status == IterationStatus::Converged
    }
}

/// Stopping criteria.
#[derive(Clone, Copy, Debug)]
pub struct MonitorConfig {
    /// Absolute residual tolerance
    pub atol: f64,
    /// Tolerance relative to the reference residual
    pub rtol: f64,
    /// Iteration cap
    pub max_iterations: usize,
    /// Residual over reference residual that counts as divergence
    pub divergence_factor: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            atol: 1e-5,
            rtol: 0.0,
            max_iterations: 100,
            divergence_factor: 1e6,
        }
    }
}

/// Tracks residuals of one loop.
#[derive(Debug, Clone)]
pub struct IterationMonitor {
    name: &'static str,
    config: MonitorConfig,
    r0: Option<f64>,
    residual: f64,
    iterations: usize,
    status: Option<IterationStatus>,
}

impl IterationMonitor {
    pub fn new(name: &'static str, config: MonitorConfig) -> Self {
        Self {
            name,
            config,
            r0: None,
            residual: f64::INFINITY,
            iterations: 0,
            status: None,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Reset and record the reference residual. Returns true when it
    /// already satisfies the absolute tolerance.
    pub fn monitor_init(&mut self, r0: f64) -> bool {
        self.r0 = Some(r0);
        self.residual = r0;
        self.iterations = 0;
        self.status = None;
        if r0 <= self.config.atol {
            self.status = Some(IterationStatus::Converged);
            debug!("{}: initial residual {:.3e} already converged", self.name, r0);
            true
        } else {
            false
        }
    }

    /// Forget any previous run. The first residual passed to
    /// [`IterationMonitor::monitor`] becomes the reference.
    pub fn reset(&mut self) {
        self.r0 = None;
        self.residual = f64::INFINITY;
        self.iterations = 0;
        self.status = None;
    }

    /// Record residual `r` after iteration `it`. Returns true when the loop
    /// should stop.
    pub fn monitor(&mut self, it: usize, r: f64) -> bool {
        let r0 = *self.r0.get_or_insert(r);
        self.iterations = it;
        self.residual = r;
        debug!("{} iteration {}: residual {:.6e}", self.name, it, r);

        let threshold = self.config.atol.max(self.config.rtol * r0);
        let status = if !r.is_finite() || (r0 > 0.0 && r > self.config.divergence_factor * r0) {
            warn!("{} diverged at iteration {}: residual {:.3e}", self.name, it, r);
            Some(IterationStatus::Diverged)
        } else if r < threshold {
            Some(IterationStatus::Converged)
        } else if it >= self.config.max_iterations {
            warn!(
                "{} reached {} iterations with residual {:.3e}",
                self.name, it, r
            );
            Some(IterationStatus::MaxIterations)
        } else {
            None
        };
        self.status = status;
        status.is_some()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn residual(&self) -> f64 {
        self.residual
    }

    pub fn status(&self) -> Option<IterationStatus> {
        self.status
    }

    /// Summary of the last run; a run that never stopped reports the cap.
    pub fn report(&self) -> SolveReport {
        let report = SolveReport {
            solver: self.name,
            iterations: self.iterations,
            residual: self.residual,
            status: self.status.unwrap_or(IterationStatus::MaxIterations),
        };
        if report.converged() {
            info!(
                "{} converged in {} iterations (residual {:.3e})",
                self.name, report.iterations, report.residual
            );
        }
        report
    }
}
