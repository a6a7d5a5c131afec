//! Synthetic frame painters shared by unit tests.

use image::{Rgba, RgbaImage};

use crate::color::Color;

pub(crate) const PAD: Color = Rgba([200, 150, 0, 255]);
pub(crate) const BORDER: Color = Rgba([0, 0, 0, 255]);
pub(crate) const BACKGROUND: Color = Rgba([0, 128, 0, 255]);

/// Frame with one filled disk: pixels with `dx² + dy² <= r²` get `color`.
pub(crate) fn disk_frame(w: u32, h: u32, center: (i64, i64), r: i64, color: Color) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let dx = i64::from(x) - center.0;
        let dy = i64::from(y) - center.1;
        if dx * dx + dy * dy <= r * r {
            color
        } else {
            BACKGROUND
        }
    })
}

/// Frame with a pad: ellipse of `PAD` fill surrounded by a `BORDER` band.
///
/// `semi_axes` are the outer semi-axes in pixels, `angle` rotates the major
/// axis from +x (radians), `band` is the border thickness in pixels.
pub(crate) fn pad_frame(
    w: u32,
    h: u32,
    center: [f64; 2],
    semi_axes: [f64; 2],
    angle: f64,
    band: f64,
) -> RgbaImage {
    let (s, c) = angle.sin_cos();
    RgbaImage::from_fn(w, h, |x, y| {
        let dx = f64::from(x) - center[0];
        let dy = f64::from(y) - center[1];
        let u = c * dx + s * dy;
        let v = -s * dx + c * dy;
        let outer = (u / semi_axes[0]).powi(2) + (v / semi_axes[1]).powi(2);
        let inner_a = semi_axes[0] - band;
        let inner_b = semi_axes[1] - band;
        let inner = (u / inner_a).powi(2) + (v / inner_b).powi(2);
        if inner <= 1.0 {
            PAD
        } else if outer <= 1.0 {
            BORDER
        } else {
            BACKGROUND
        }
    })
}

/// Circular pad centered in a square viewport.
pub(crate) fn circle_pad_frame(size: u32, radius: f64, band: f64) -> RgbaImage {
    let c = f64::from(size) / 2.0;
    pad_frame(size, size, [c, c], [radius, radius], 0.0, band)
}
