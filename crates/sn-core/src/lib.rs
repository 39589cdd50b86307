//! sn-core: shared foundation for the discrete-ordinates workspace.
//!
//! Contains:
//! - numeric (Real + vector norms)
//! - buffer (two-slot buffers for stationary iterations)
//! - timing (opt-in wall-clock accounting)

pub mod buffer;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use buffer::DoubleBuffer;
pub use numeric::*;
