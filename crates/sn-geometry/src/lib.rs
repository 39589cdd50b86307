//! sn-geometry: structured Cartesian meshes for discrete-ordinates sweeps.
//!
//! Provides:
//! - `Dimension`, `Axis` and `Side` conventions shared by sweeps and boundaries
//! - `Mesh`, an immutable cell-centred grid with a per-cell material map
//! - `MeshBuilder`, a coarse/fine builder with validation
//!
//! # Example
//!
//! ```
//! use sn_geometry::{Axis, Dimension, MeshBuilder};
//!
//! let mesh = MeshBuilder::new(Dimension::One)
//!     .axis(Axis::X, vec![0.0, 2.0, 5.0], vec![2, 3])
//!     .materials(vec![0, 1])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(mesh.number_cells(), 5);
//! assert_eq!(mesh.material(4), 1);
//! ```

pub mod builder;
pub mod error;
pub mod mesh;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::MeshBuilder;
pub use error::{GeometryError, GeometryResult};
pub use mesh::{Axis, Dimension, Mesh, Side};
