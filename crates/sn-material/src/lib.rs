//! sn-material: multigroup cross sections.
//!
//! A [`Material`] holds σt, σa, νσf, χ and the scattering matrix for every
//! material and group. Lookups are only meaningful after [`Material::finalize`],
//! which also derives the scatter bounds and upscatter cutoffs used to split
//! a multigroup solve into downscatter and coupled blocks.

pub mod error;
pub mod library;
pub mod material;

pub use error::{MaterialError, MaterialResult};
pub use material::Material;
