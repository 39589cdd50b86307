//! Solver configuration.

use serde::{Deserialize, Serialize};
use sn_transport::EquationKind;

/// Within-group solver selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InnerSolverKind {
    /// Source iteration (default).
    #[default]
    SourceIteration,
    /// GMRES on the within-group transport operator.
    Gmres,
}

/// Multigroup solver selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OuterSolverKind {
    /// Gauss-Seidel over groups (default).
    #[default]
    GaussSeidel,
    /// GMRES on the multigroup transport operator for the upscatter block.
    Krylov,
}

/// Settings shared by every solver of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Per-cell closure
    pub equation: EquationKind,
    /// Within-group solver
    pub inner_solver: InnerSolverKind,
    /// Within-group tolerance
    pub inner_tolerance: f64,
    /// Within-group iteration cap
    pub inner_max_iterations: usize,
    /// Multigroup solver
    pub outer_solver: OuterSolverKind,
    /// Multigroup tolerance
    pub outer_tolerance: f64,
    /// Multigroup iteration cap
    pub outer_max_iterations: usize,
    /// First group of the coupled block; defaults to the material's
    pub upscatter_cutoff: Option<usize>,
    /// Eigenvalue and fission density tolerance
    pub eigen_tolerance: f64,
    /// Power iteration cap
    pub eigen_max_iterations: usize,
    /// GMRES Krylov subspace size between restarts
    pub gmres_restart: usize,
    /// Solve the adjoint problem
    pub adjoint: bool,
    /// Include fission in fixed-source problems
    pub multiply: bool,
    /// Keep cell-average angular flux for every angle
    pub store_angular_flux: bool,
    /// Residual growth over the initial residual that counts as divergence
    pub divergence_factor: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            equation: EquationKind::default(),
            inner_solver: InnerSolverKind::default(),
            inner_tolerance: 1e-5,
            inner_max_iterations: 100,
            outer_solver: OuterSolverKind::default(),
            outer_tolerance: 1e-5,
            outer_max_iterations: 20,
            upscatter_cutoff: None,
            eigen_tolerance: 1e-5,
            eigen_max_iterations: 200,
            gmres_restart: 20,
            adjoint: false,
            multiply: false,
            store_angular_flux: false,
            divergence_factor: 1e6,
        }
    }
}
