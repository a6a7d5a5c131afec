use image::{Rgba, RgbaImage};

use crate::frame::{Frame, FrameContext, FrameProvider};

use super::camera::{Camera, CameraIntrinsics};
use super::render::{render_frame, TexturedQuad};
use super::texture::render_pad_texture;
use super::SceneConfig;

/// Endless frame source: a textured pad on the ground seen by a movable
/// pinhole camera.
pub struct SyntheticScene {
    config: SceneConfig,
    texture: RgbaImage,
    intrinsics: CameraIntrinsics,
    camera: Camera,
}

impl SyntheticScene {
    pub fn new(config: SceneConfig) -> Result<Self, String> {
        config.validate()?;
        let texture = render_pad_texture(&config.texture);
        let intrinsics = CameraIntrinsics::from_fov(config.viewport_px, config.fov_rad);
        let camera = Camera::new(config.start_position, config.start_yaw, config.start_pitch);
        tracing::debug!(
            texture_size = config.texture.size,
            viewport = config.viewport_px,
            "synthetic scene ready"
        );
        Ok(Self {
            config,
            texture,
            intrinsics,
            camera,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn texture(&self) -> &RgbaImage {
        &self.texture
    }

    /// Render the current pose without moving.
    pub fn render(&self) -> Frame {
        let quad = TexturedQuad {
            texture: &self.texture,
            half_extent: self.config.pad_radius,
        };
        let pixels = render_frame(
            &self.camera,
            self.intrinsics,
            self.config.viewport_px,
            &quad,
            Rgba(self.config.clear_color),
        );
        Frame {
            pixels,
            actual_distance: self.camera.distance_to_origin(),
        }
    }
}

impl FrameProvider for SyntheticScene {
    fn next_frame(&mut self, ctx: &FrameContext) -> Option<Frame> {
        self.camera.update(
            self.config.start_yaw,
            self.config.start_pitch,
            ctx,
            self.config.speed,
        );
        Some(self.render())
    }
}
