//! sn-angle: discrete-ordinates quadrature sets.
//!
//! Directions are stored for the first octant only; every other octant is
//! obtained by sign flips. Weights sum to [`angular_norm`] over the sphere.

pub mod error;
pub mod legendre;
pub mod quadrature;

pub use error::{AngleError, AngleResult};
pub use quadrature::{Quadrature, QuadratureSpec, angular_norm};
