//! Pinhole camera for the synthetic scene.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::frame::{Controls, FrameContext};

/// Pinhole intrinsics of a square viewport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length in pixels (equal on both axes).
    pub f: f64,
    /// Principal point x (pixels).
    pub cx: f64,
    /// Principal point y (pixels).
    pub cy: f64,
}

impl CameraIntrinsics {
    /// Intrinsics for a `viewport_px` square viewport with vertical field of
    /// view `fov_rad`.
    pub fn from_fov(viewport_px: u32, fov_rad: f64) -> Self {
        let half = f64::from(viewport_px) / 2.0;
        Self {
            f: half / (fov_rad / 2.0).tan(),
            cx: half,
            cy: half,
        }
    }

    pub fn is_valid(self) -> bool {
        self.f.is_finite() && self.cx.is_finite() && self.cy.is_finite() && self.f.abs() > 1e-12
    }

    /// Pixel (sampled at its center) to normalized coordinates, y down.
    pub fn pixel_to_normalized(self, pixel_xy: [f64; 2]) -> [f64; 2] {
        [
            (pixel_xy[0] + 0.5 - self.cx) / self.f,
            (pixel_xy[1] + 0.5 - self.cy) / self.f,
        ]
    }

    pub fn normalized_to_pixel(self, normalized_xy: [f64; 2]) -> [f64; 2] {
        [
            self.f * normalized_xy[0] + self.cx,
            self.f * normalized_xy[1] + self.cy,
        ]
    }
}

/// Camera-frame ray through a normalized image point (image y points down,
/// camera y up).
pub(crate) fn camera_ray(normalized_xy: [f64; 2]) -> Vector3<f64> {
    Vector3::new(normalized_xy[0], -normalized_xy[1], -1.0)
}

/// Camera pose: position plus heading (about +y) and tilt (about the camera x
/// axis). At zero yaw and pitch the camera looks along -z with +y up; a pitch
/// of `-pi/2` looks straight down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vector3<f64>,
    pub yaw: f64,
    pub pitch: f64,
}

impl Camera {
    pub fn new(position: [f64; 3], yaw: f64, pitch: f64) -> Self {
        Self {
            position: Vector3::from(position),
            yaw,
            pitch,
        }
    }

    /// Camera-to-world rotation.
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch)
    }

    /// World-space ray direction through a normalized image point.
    pub fn ray_direction(&self, normalized_xy: [f64; 2]) -> Vector3<f64> {
        (self.rotation() * camera_ray(normalized_xy)).normalize()
    }

    /// Ground-plane heading for the current yaw.
    pub fn forwards(&self) -> Vector3<f64> {
        Vector3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Ground-plane right vector for the current yaw.
    pub fn right(&self) -> Vector3<f64> {
        Vector3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Translate by `speed` along every pressed movement control.
    pub fn apply_movement(&mut self, controls: Controls, speed: f64) {
        let moves = [
            (Controls::FORWARDS, self.forwards()),
            (Controls::BACKWARDS, -self.forwards()),
            (Controls::RIGHT, self.right()),
            (Controls::LEFT, -self.right()),
            (Controls::UP, Vector3::y()),
            (Controls::DOWN, -Vector3::y()),
        ];
        for (flag, dir) in moves {
            if controls.contains(flag) {
                self.position += dir * speed;
            }
        }
    }

    /// Orientation from a base pose plus the context's pointer offsets, then
    /// movement along the new heading.
    pub fn update(&mut self, base_yaw: f64, base_pitch: f64, ctx: &FrameContext, speed: f64) {
        self.yaw = base_yaw + ctx.yaw;
        self.pitch = base_pitch + ctx.pitch;
        self.apply_movement(ctx.controls, speed);
    }

    /// Euclidean distance to the world origin.
    pub fn distance_to_origin(&self) -> f64 {
        self.position.norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn intrinsics_match_fov() {
        let k = CameraIntrinsics::from_fov(950, FRAC_PI_2);
        assert!(k.is_valid());
        assert_relative_eq!(k.f, 475.0, epsilon = 1e-9);
        let n = k.pixel_to_normalized([949.5, 474.5]);
        assert_relative_eq!(n[0], 1.0, epsilon = 1e-9);
        let p = k.normalized_to_pixel(n);
        assert_relative_eq!(p[0], 950.0, epsilon = 1e-9);
    }

    #[test]
    fn downward_pitch_looks_at_ground() {
        let cam = Camera::new([0.0, 3.0, 0.0], 0.0, -FRAC_PI_2);
        let d = cam.ray_direction([0.0, 0.0]);
        assert_relative_eq!(d, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
        // Image top maps to -z.
        let up = cam.ray_direction([0.0, -1.0]);
        assert!(up.z < 0.0);
    }

    #[test]
    fn movement_follows_heading() {
        let mut cam = Camera::new([0.0, 0.0, 0.0], FRAC_PI_2, 0.0);
        cam.apply_movement(Controls::FORWARDS | Controls::UP, 0.5);
        assert_relative_eq!(cam.position, Vector3::new(-0.5, 0.5, 0.0), epsilon = 1e-12);
        cam.apply_movement(Controls::FORWARDS | Controls::BACKWARDS, 1.0);
        assert_relative_eq!(cam.position, Vector3::new(-0.5, 0.5, 0.0), epsilon = 1e-12);
        cam.apply_movement(Controls::RIGHT, 1.0);
        assert_relative_eq!(cam.position.z, -1.0, epsilon = 1e-12);
        assert_relative_eq!(
            cam.distance_to_origin(),
            (0.25f64 + 0.25 + 1.0).sqrt(),
            epsilon = 1e-12
        );
    }
}
