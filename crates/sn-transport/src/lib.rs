//! sn-transport: discrete-ordinates sweep machinery.
//!
//! The pieces a multigroup solve is assembled from:
//! - [`State`]: flux moments (and optionally angular flux) per group
//! - [`BoundaryManager`]: incident/outgoing boundary angular flux
//! - [`Equation`]: per-cell closure (diamond or step difference)
//! - [`SweepSource`]: isotropic sweep source from scatter, fission and
//!   external contributions
//! - [`FissionSource`]: fission density and scaled emission
//! - [`Sweeper`]: one full space-angle sweep for one group
//! - [`CurrentTally`]: opt-in partial currents on a coarse mesh
//!
//! None of these own each other. A solver session owns all of them and
//! passes collaborators explicitly where one reads another's data.

pub mod boundary;
pub mod current_tally;
pub mod equation;
pub mod error;
pub mod external_source;
pub mod fission_source;
pub mod state;
pub mod sweep_source;
pub mod sweeper;

pub use boundary::{BoundaryCondition, BoundaryManager, Direction};
pub use current_tally::CurrentTally;
pub use equation::{DiamondDifference, Equation, EquationKind, StepDifference};
pub use error::{TransportError, TransportResult};
pub use external_source::{ConstantSource, ExternalSource, RegionSource};
pub use fission_source::FissionSource;
pub use state::State;
pub use sweep_source::SweepSource;
pub use sweeper::Sweeper;
