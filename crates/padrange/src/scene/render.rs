//! CPU ray caster for a textured square on the ground plane.

use image::{Rgba, RgbaImage};
use nalgebra::Vector3;

use super::camera::{camera_ray, Camera, CameraIntrinsics};

/// Ground-plane square `[-half_extent, half_extent]^2` at `y = 0`, textured
/// with `texture` (texel x along +x, texel y along +z).
pub struct TexturedQuad<'a> {
    pub texture: &'a RgbaImage,
    pub half_extent: f64,
}

impl TexturedQuad<'_> {
    /// Texel hit by the ray, or `None` when the ray misses the quad.
    fn sample(&self, origin: &Vector3<f64>, dir: &Vector3<f64>) -> Option<Rgba<u8>> {
        if dir.y.abs() < 1e-12 {
            return None;
        }
        let t = -origin.y / dir.y;
        if t <= 0.0 {
            return None;
        }
        let hit = origin + dir * t;
        let e = self.half_extent;
        if hit.x.abs() > e || hit.z.abs() > e {
            return None;
        }
        let (tw, th) = self.texture.dimensions();
        let u = ((hit.x + e) / (2.0 * e) * f64::from(tw)).floor() as i64;
        let v = ((hit.z + e) / (2.0 * e) * f64::from(th)).floor() as i64;
        let u = u.clamp(0, i64::from(tw) - 1) as u32;
        let v = v.clamp(0, i64::from(th) - 1) as u32;
        Some(*self.texture.get_pixel(u, v))
    }
}

/// Source-over blend of `src` onto an opaque `dst`.
fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let a = u32::from(src[3]);
    let mix = |s: u8, d: u8| ((u32::from(s) * a + u32::from(d) * (255 - a) + 127) / 255) as u8;
    Rgba([mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2]), 255])
}

/// Render one `viewport_px` square frame; rays that miss show `clear`.
pub fn render_frame(
    camera: &Camera,
    intrinsics: CameraIntrinsics,
    viewport_px: u32,
    quad: &TexturedQuad<'_>,
    clear: Rgba<u8>,
) -> RgbaImage {
    let rotation = camera.rotation();
    let origin = camera.position;
    RgbaImage::from_fn(viewport_px, viewport_px, |x, y| {
        let n = intrinsics.pixel_to_normalized([f64::from(x), f64::from(y)]);
        let dir = rotation * camera_ray(n);
        match quad.sample(&origin, &dir) {
            Some(texel) => blend_over(texel, clear),
            None => clear,
        }
    })
}
