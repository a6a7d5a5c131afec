//! Pixel-walking primitives used by the distance pipeline.
//!
//! - [`linear_search`]: straight ray march until a target color is hit.
//! - [`classify_orientation`]: which horizontal direction from the pad's top
//!   point leads toward the major-axis endpoint.
//! - [`trace_border`]: adaptive contour walk to an extremal radius.

mod border;
mod linear;
mod orientation;

pub use border::{trace_border, BorderTrace, RotationSense, TraceError, TraceParams};
pub use linear::linear_search;
pub use orientation::{classify_orientation, AxisOrientation};
