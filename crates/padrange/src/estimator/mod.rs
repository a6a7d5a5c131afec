//! High-level distance estimation API.
//!
//! [`Estimator`] wraps an [`EstimatorConfig`] and runs the per-frame pipeline.
//! Create once, estimate on many frames.

mod config;
mod pipeline;
pub mod projection;
mod result;

use std::path::Path;

use image::RgbaImage;

use crate::region::ImageRegion;

pub use config::{AnnotationConfig, EstimatorConfig, TraceConfig};
pub use result::{Accuracy, DistanceEstimate, DistanceReport, Stage, StageSummary};

/// Primary estimation interface.
///
/// # Examples
///
/// ```
/// use padrange::{Accuracy, Estimator};
/// use image::{Rgba, RgbaImage};
///
/// let estimator = Estimator::default();
/// let frame = RgbaImage::from_pixel(64, 64, Rgba([0, 128, 0, 255]));
/// assert_eq!(estimator.estimate(&frame).accuracy, Accuracy::None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with full config control. The config is validated first.
    pub fn with_config(config: EstimatorConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load a JSON config and create an estimator in one step.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_config(EstimatorConfig::from_json_file(path)?)?)
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Replace the configuration; an invalid one leaves the current config.
    pub fn set_config(&mut self, config: EstimatorConfig) -> Result<(), String> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Estimate the pad distance in one frame.
    pub fn estimate(&self, frame: &RgbaImage) -> DistanceEstimate {
        pipeline::estimate_distance(frame, &self.config, false).0
    }

    /// Estimate with debug drawing enabled.
    ///
    /// The returned region holds the cropped frame and its annotated copy; it
    /// is `None` when no border was found.
    pub fn estimate_with_debug(&self, frame: &RgbaImage) -> (DistanceEstimate, Option<ImageRegion>) {
        pipeline::estimate_distance(frame, &self.config, true)
    }
}
