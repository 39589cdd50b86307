//! Iterative solvers for multigroup discrete-ordinates transport.
//!
//! This crate assembles the sweep machinery of `sn-transport` into a
//! session and drives it with nested iterations:
//! - within-group: source iteration or GMRES on the within-group operator
//! - multigroup: Gauss-Seidel over groups, or GMRES on the multigroup
//!   transport operator for the upscatter block
//! - eigenvalue: power iteration on the fission source
//!
//! Every loop stops through an [`IterationMonitor`]; running out of
//! iterations is reported in a [`SolveReport`], not as an error.

pub mod eigen;
pub mod error;
pub mod gmres;
pub mod manager;
pub mod mg_operator;
pub mod mg_solver;
pub mod monitor;
pub mod operator;
pub mod problem;
pub mod session;
pub mod settings;
pub mod wg_operator;
pub mod wg_solver;
pub mod window;

pub use eigen::PowerIteration;
pub use error::{SolverError, SolverResult};
pub use gmres::gmres;
pub use manager::{
    EigenManager, FixedSourceManager, TransportSolution, build_inner, build_outer,
};
pub use mg_operator::MultigroupTransportOperator;
pub use mg_solver::{GaussSeidel, MultigroupKrylov, MultigroupSolver};
pub use monitor::{IterationMonitor, IterationStatus, MonitorConfig, SolveReport};
pub use operator::{DenseOperator, LinearOperator};
pub use problem::TransportProblem;
pub use session::TransportSession;
pub use settings::{InnerSolverKind, OuterSolverKind, SolverSettings};
pub use wg_operator::WithinGroupOperator;
pub use wg_solver::{SourceIteration, WithinGroupGmres, WithinGroupSolver};
pub use window::GroupWindow;
