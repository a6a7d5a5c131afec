use std::path::Path;

use crate::color::{rgba, ChannelTolerance, Color, ALPHA_ANY};

/// Border-trace tuning.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Non-improving steps tolerated after each improvement.
    pub step_budget: usize,
    /// Absolute cap on steps per trace; `None` scales with the crop size.
    #[serde(default)]
    pub step_ceiling: Option<usize>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            step_budget: 20,
            step_ceiling: None,
        }
    }
}

/// Debug overlay colors, one per pipeline stage.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Draw into the annotated buffer when a snapshot is requested.
    pub enabled: bool,
    pub linear_search: [u8; 4],
    pub orientation: [u8; 4],
    pub border_trace: [u8; 4],
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            linear_search: [255, 0, 0, 255],
            orientation: [255, 255, 0, 255],
            border_trace: [255, 0, 255, 255],
        }
    }
}

/// Distance-estimator configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Pad interior color.
    pub pad_color: [u8; 4],
    /// Pad outline color.
    pub border_color: [u8; 4],
    /// Per-channel color tolerance (strict, 0..=255). Alpha is ignored.
    pub tolerance: u16,
    /// Vertical field of view in radians.
    pub fov_rad: f64,
    /// Square viewport size in pixels.
    pub viewport_px: u32,
    /// Pad radius in world units.
    pub pad_radius: f64,
    pub trace: TraceConfig,
    pub annotations: AnnotationConfig,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            pad_color: [200, 150, 0, 255],
            border_color: [0, 0, 0, 255],
            tolerance: 40,
            fov_rad: std::f64::consts::FRAC_PI_2,
            viewport_px: 950,
            pad_radius: 1.0,
            trace: TraceConfig::default(),
            annotations: AnnotationConfig::default(),
        }
    }
}

impl EstimatorConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.fov_rad.is_finite() && self.fov_rad > 0.0 && self.fov_rad < std::f64::consts::PI)
        {
            return Err(format!("fov_rad must be in (0, pi), got {}", self.fov_rad));
        }
        if self.viewport_px == 0 {
            return Err("viewport_px must be positive".to_string());
        }
        if !(self.pad_radius.is_finite() && self.pad_radius > 0.0) {
            return Err(format!("pad_radius must be positive, got {}", self.pad_radius));
        }
        if self.tolerance == 0 || self.tolerance > 255 {
            return Err(format!("tolerance must be in 1..=255, got {}", self.tolerance));
        }
        if self.trace.step_budget == 0 {
            return Err("trace.step_budget must be positive".to_string());
        }
        if self.pad_color == self.border_color {
            return Err("pad_color and border_color must differ".to_string());
        }
        Ok(())
    }

    pub fn pad(&self) -> Color {
        rgba(self.pad_color)
    }

    pub fn border(&self) -> Color {
        rgba(self.border_color)
    }

    pub fn channel_tolerance(&self) -> ChannelTolerance {
        ChannelTolerance::rgba(self.tolerance, self.tolerance, self.tolerance, ALPHA_ANY)
    }
}
