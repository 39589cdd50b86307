//! Top-level solve drivers.

use serde::Serialize;
use tracing::{info, warn};

use crate::eigen::PowerIteration;
use crate::error::{SolverError, SolverResult};
use crate::mg_solver::{GaussSeidel, MultigroupKrylov, MultigroupSolver};
use crate::monitor::{MonitorConfig, SolveReport};
use crate::problem::TransportProblem;
use crate::session::TransportSession;
use crate::settings::{InnerSolverKind, OuterSolverKind, SolverSettings};
use crate::wg_solver::{SourceIteration, WithinGroupGmres, WithinGroupSolver};
use sn_transport::BoundaryCondition;

/// Result of a completed solve.
#[derive(Clone, Debug, Serialize)]
pub struct TransportSolution {
    /// Scalar flux, `phi[group][cell]`
    pub phi: Vec<Vec<f64>>,
    /// Multiplication factor for eigenvalue problems
    pub eigenvalue: Option<f64>,
    pub adjoint: bool,
    /// Top-level solver reports, outermost first
    pub reports: Vec<SolveReport>,
}

impl TransportSolution {
    pub fn converged(&self) -> bool {
        self.reports.iter().all(SolveReport::converged)
    }
}

/// Within-group solver selected by the settings.
pub fn build_inner(settings: &SolverSettings) -> Box<dyn WithinGroupSolver> {
    match settings.inner_solver {
        InnerSolverKind::SourceIteration => Box::new(SourceIteration::new(MonitorConfig {
            atol: settings.inner_tolerance,
            rtol: 0.0,
            max_iterations: settings.inner_max_iterations,
            divergence_factor: settings.divergence_factor,
        })),
        InnerSolverKind::Gmres => Box::new(WithinGroupGmres::new(
            MonitorConfig {
                atol: 0.0,
                rtol: settings.inner_tolerance,
                max_iterations: settings.inner_max_iterations,
                divergence_factor: settings.divergence_factor,
            },
            settings.gmres_restart,
        )),
    }
}

/// Multigroup solver selected by the settings.
pub fn build_outer(settings: &SolverSettings) -> Box<dyn MultigroupSolver> {
    let inner = build_inner(settings);
    match settings.outer_solver {
        OuterSolverKind::GaussSeidel => Box::new(GaussSeidel::new(
            inner,
            MonitorConfig {
                atol: settings.outer_tolerance,
                rtol: 0.0,
                max_iterations: settings.outer_max_iterations,
                divergence_factor: settings.divergence_factor,
            },
        )),
        OuterSolverKind::Krylov => Box::new(MultigroupKrylov::new(
            inner,
            MonitorConfig {
                atol: 0.0,
                rtol: settings.outer_tolerance,
                max_iterations: settings.outer_max_iterations,
                divergence_factor: settings.divergence_factor,
            },
            settings.gmres_restart,
        )),
    }
}

fn solution(
    session: &TransportSession,
    eigenvalue: Option<f64>,
    reports: Vec<SolveReport>,
) -> TransportSolution {
    TransportSolution {
        phi: session.state().all_phi().to_vec(),
        eigenvalue,
        adjoint: session.state().adjoint(),
        reports,
    }
}

/// Fixed-source driver.
pub struct FixedSourceManager {
    session: TransportSession,
    solver: Box<dyn MultigroupSolver>,
}

impl FixedSourceManager {
    pub fn new(problem: &TransportProblem) -> SolverResult<Self> {
        let fixed_incident = problem
            .boundary
            .iter()
            .any(|c| matches!(c, BoundaryCondition::FixedIncident(_)));
        if problem.external.is_none() && !fixed_incident {
            warn!("Fixed-source problem has neither an external source nor incident flux");
        }
        let session = TransportSession::new(problem)?;
        let solver = build_outer(session.settings());
        Ok(Self { session, solver })
    }

    pub fn session(&self) -> &TransportSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TransportSession {
        &mut self.session
    }

    pub fn solve(&mut self) -> SolverResult<TransportSolution> {
        info!("Solving fixed-source problem with {}", self.solver.name());
        let report = self.solver.solve(&mut self.session)?;
        Ok(solution(&self.session, None, vec![report]))
    }
}

/// Eigenvalue driver.
pub struct EigenManager {
    session: TransportSession,
    power: PowerIteration,
}

impl EigenManager {
    pub fn new(problem: &TransportProblem) -> SolverResult<Self> {
        let mut problem = problem.clone();
        if problem.settings.multiply {
            warn!("Ignoring multiply setting for an eigenvalue problem");
            problem.settings.multiply = false;
        }
        let session = TransportSession::new(&problem)?;
        if !session.fission().is_fissile() {
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
        let settings = session.settings();
        let power = PowerIteration::new(
            build_outer(settings),
            MonitorConfig {
                atol: settings.eigen_tolerance,
                rtol: 0.0,
                max_iterations: settings.eigen_max_iterations,
                divergence_factor: settings.divergence_factor,
            },
        );
        Ok(Self { session, power })
    }

    pub fn session(&self) -> &TransportSession {
        &self.session
    }

    pub fn solve(&mut self) -> SolverResult<TransportSolution> {
        info!("Solving eigenvalue problem");
        let report = self.power.solve(&mut self.session)?;
        let mut reports = vec![report];
        reports.extend(self.power.last_multigroup().cloned());
        let k = self.session.state().eigenvalue();
        Ok(solution(&self.session, Some(k), reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_angle::Quadrature;
    use sn_geometry::{Dimension, Mesh};
    use sn_material::library;
    use sn_transport::{ConstantSource, ExternalSource};
    use std::sync::Arc;

    fn problem(nu_sigma_f: f64) -> TransportProblem {
        let mesh = Arc::new(Mesh::uniform(Dimension::One, 4, 1.0, 0));
        let material = Arc::new(library::one_group(1.0, 0.5, nu_sigma_f).unwrap());
        let quad = Arc::new(Quadrature::gauss_legendre(2).unwrap());
        let mut p = TransportProblem::new(mesh, material, quad);
        p.boundary = vec![BoundaryCondition::Reflective; 2];
        p.settings.inner_tolerance = 1e-12;
        p.settings.eigen_tolerance = 1e-9;
        p
    }

    #[test]
    fn fixed_source_solution_serializes() {
        let q: Arc<dyn ExternalSource> =
            Arc::new(ConstantSource::new(Dimension::One, vec![1.0]).unwrap());
        let p = problem(0.0).with_external(q);
        let mut manager = FixedSourceManager::new(&p).unwrap();
        let sol = manager.solve().unwrap();
        assert!(sol.converged());
        assert_eq!(sol.eigenvalue, None);
        assert!((sol.phi[0][0] - 2.0).abs() < 1e-9);

        let json = serde_json::to_string(&sol).unwrap();
        assert!(json.contains("\"status\":\"converged\""));
    }

    #[test]
    fn multiplying_fixed_source_uses_fission() {
        let q: Arc<dyn ExternalSource> =
            Arc::new(ConstantSource::new(Dimension::One, vec![1.0]).unwrap());
        let mut p = problem(0.25).with_external(q);
        p.settings.multiply = true;
        p.settings.outer_tolerance = 1e-11;
        p.settings.outer_max_iterations = 200;
        let sol = FixedSourceManager::new(&p).unwrap().solve().unwrap();
        assert!(sol.converged());
        // q / (σt - σs - νσf) = 4
        assert!((sol.phi[0][2] - 4.0).abs() < 1e-8, "{}", sol.phi[0][2]);
    }

    #[test]
    fn eigen_manager_reports_k() {
        let mut p = problem(0.75);
        p.settings.outer_solver = OuterSolverKind::Krylov;
        p.settings.inner_solver = InnerSolverKind::Gmres;
        let sol = EigenManager::new(&p).unwrap().solve().unwrap();
        assert!(sol.converged());
        assert!((sol.eigenvalue.unwrap() - 1.5).abs() < 1e-7);
        assert_eq!(sol.reports.len(), 2);
    }

    #[test]
    fn eigen_manager_requires_fission() {
        assert!(EigenManager::new(&problem(0.0)).is_err());
    }

    #[test]
    fn eigen_manager_rejects_fixed_sources() {
        let q: Arc<dyn ExternalSource> =
            Arc::new(ConstantSource::new(Dimension::One, vec![1.0]).unwrap());
        let with_source = problem(0.75).with_external(q);
        assert!(matches!(
            EigenManager::new(&with_source),
            Err(SolverError::ProblemSetup { .. })
        ));

        let mut incident = problem(0.75);
        incident.boundary[0] = BoundaryCondition::FixedIncident(vec![1.0]);
        assert!(matches!(
            EigenManager::new(&incident),
            Err(SolverError::ProblemSetup { .. })
        ));
    }
}
