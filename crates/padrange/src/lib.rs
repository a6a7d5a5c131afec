//! padrange: monocular range estimation from a landing pad's apparent size.
//!
//! The pad is a filled disk with a dark outline. Seen from any pose it
//! projects to an ellipse whose major axis keeps the pad's true diameter, so
//! its pixel length gives the range through the pinhole relation. The
//! per-frame pipeline stages are:
//!
//! 1. **Scan** – four-directional raster search for the outline's bounding box.
//! 2. **Crop** – copy the box into an [`ImageRegion`] with an annotation overlay.
//! 3. **Locate** – linear search down to the pad's top, axis orientation there.
//! 4. **Trace** – adaptive border walks to both major-axis endpoints.
//! 5. **Project** – apparent diameter to distance; the bounding box is the
//!    fallback when tracing fails.
//!
//! # Public API
//! - [`Estimator`] and [`EstimatorConfig`] as primary entry points
//! - [`FrameProvider`], [`FrameLoop`] and [`FrameContext`] for per-frame runs
//! - [`SyntheticScene`] as a self-contained frame source
//! - the stage primitives ([`scan_border_extent`], [`linear_search`],
//!   [`classify_orientation`], [`trace_border`]) for custom pipelines

mod color;
pub mod debug_dump;
mod estimator;
mod frame;
mod geom;
mod region;
mod scan;
pub mod scene;
mod trace;

#[cfg(test)]
mod test_utils;

pub use color::{colors_match, rgba, ChannelTolerance, Color, ALPHA_ANY};
pub use debug_dump::SnapshotWriter;
pub use estimator::projection::{apparent_size_at_distance, distance_from_apparent_size};
pub use estimator::{
    Accuracy, AnnotationConfig, DistanceEstimate, DistanceReport, Estimator, EstimatorConfig,
    Stage, StageSummary, TraceConfig,
};
pub use frame::{
    Controls, Frame, FrameContext, FrameLoop, FrameOutcome, FrameProvider, StillFrames,
};
pub use geom::{Direction, PixelPoint};
pub use region::{ImageRegion, RegionError};
pub use scan::{scan_border_extent, EdgeScan, PixelRect};
pub use scene::{SceneConfig, SyntheticScene};
pub use trace::{
    classify_orientation, linear_search, trace_border, AxisOrientation, BorderTrace,
    RotationSense, TraceError, TraceParams,
};
