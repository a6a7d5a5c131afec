use std::fmt;

use crate::geom::PixelPoint;
use crate::scan::PixelRect;
use crate::trace::AxisOrientation;

/// How much of the pipeline succeeded for a frame.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    /// No border pixels in the frame.
    None,
    /// Bounding-box estimate only.
    Coarse,
    /// Both axis endpoints resolved.
    Refined,
}

impl Accuracy {
    /// Numeric level: 0, 1 or 2.
    pub fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Coarse => 1,
            Self::Refined => 2,
        }
    }
}

/// Refinement stage that stopped the pipeline early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Crop,
    TopSearch,
    Orientation,
    FirstTrace,
    OppositeSnap,
    OppositeTrace,
    Refine,
    Diameter,
}

/// Intermediate values recorded while processing one frame.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageSummary {
    /// Border bounding box in frame pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<PixelRect>,
    /// Top pad point in crop pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<PixelPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<AxisOrientation>,
    /// Axis endpoints A and B in crop pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<[PixelPoint; 2]>,
    /// Apparent pad diameter in pixels used for the distance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter_px: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
}

/// Per-frame pipeline output.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceEstimate {
    pub accuracy: Accuracy,
    /// Estimated distance in world units; `None` at [`Accuracy::None`].
    pub distance: Option<f64>,
    pub stages: StageSummary,
}

impl DistanceEstimate {
    pub fn undetected() -> Self {
        Self {
            accuracy: Accuracy::None,
            distance: None,
            stages: StageSummary::default(),
        }
    }
}

/// Estimate paired with the ground-truth distance for reporting.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceReport {
    pub estimate: DistanceEstimate,
    pub actual_distance: f64,
}

impl fmt::Display for DistanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Distance (calculated/actual): ")?;
        match (self.estimate.accuracy, self.estimate.distance) {
            (Accuracy::Refined, Some(d)) => write!(f, "{:.4} / {:.4}", d, self.actual_distance),
            (Accuracy::Coarse, Some(d)) => {
                write!(f, "{:.4} / {:.4} +-100%", d, self.actual_distance)
            }
            _ => write!(f, "NA / {:.4}", self.actual_distance),
        }
    }
}
