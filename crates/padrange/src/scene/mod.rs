//! Synthetic landing-pad scene used as a frame source.

mod camera;
mod noise;
mod provider;
mod render;
mod texture;

use std::path::Path;

pub use camera::{Camera, CameraIntrinsics};
pub use noise::{apply_noise, value_noise, NoiseParams};
pub use provider::SyntheticScene;
pub use render::{render_frame, TexturedQuad};
pub use texture::{render_pad_texture, PadTextureStyle};

/// Scene and camera configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Square viewport size in pixels.
    pub viewport_px: u32,
    /// Vertical field of view in radians.
    pub fov_rad: f64,
    /// Color of pixels that miss the pad.
    pub clear_color: [u8; 4],
    /// Half side of the textured square; the pad disk has this radius.
    pub pad_radius: f64,
    pub texture: PadTextureStyle,
    /// Camera position at the first frame.
    pub start_position: [f64; 3],
    pub start_yaw: f64,
    /// Initial tilt; `-pi/2` looks straight down at the pad.
    pub start_pitch: f64,
    /// World units moved per frame per pressed control.
    pub speed: f64,
    /// Radians per pointer unit.
    pub sensitivity: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            viewport_px: 950,
            fov_rad: std::f64::consts::FRAC_PI_2,
            clear_color: [0, 128, 0, 255],
            pad_radius: 1.0,
            texture: PadTextureStyle::default(),
            start_position: [0.0, 3.0, 0.0],
            start_yaw: 0.0,
            start_pitch: -std::f64::consts::FRAC_PI_2,
            speed: 0.01,
            sensitivity: 0.001,
        }
    }
}

impl SceneConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.viewport_px == 0 {
            return Err("viewport_px must be positive".to_string());
        }
        if !(self.fov_rad > 0.0 && self.fov_rad < std::f64::consts::PI) {
            return Err(format!("fov_rad must be in (0, pi), got {}", self.fov_rad));
        }
        if !(self.pad_radius.is_finite() && self.pad_radius > 0.0) {
            return Err(format!("pad_radius must be positive, got {}", self.pad_radius));
        }
        if self.clear_color[3] != 255 {
            return Err("clear_color must be opaque".to_string());
        }
        if !self.speed.is_finite() || !self.sensitivity.is_finite() {
            return Err("speed and sensitivity must be finite".to_string());
        }
        self.texture.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn json_overrides_nested_fields() {
        let cfg: SceneConfig = serde_json::from_str(
            r#"{ "viewport_px": 320, "texture": { "size": 256, "noise": { "seed": 5 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.viewport_px, 320);
        assert_eq!(cfg.texture.size, 256);
        assert_eq!(cfg.texture.stroke_weight, 100);
        assert_eq!(cfg.texture.noise.unwrap().seed, 5);
        assert_eq!(cfg.start_position, [0.0, 3.0, 0.0]);
    }

    #[test]
    fn rejects_translucent_clear_color() {
        let cfg = SceneConfig {
            clear_color: [0, 0, 0, 0],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
