//! Four-directional raster search for the extent of border-colored pixels.

use image::RgbaImage;

use crate::color::{colors_match, ChannelTolerance, Color};
use crate::geom::PixelPoint;

/// Per-edge scan outcome. An edge is `None` when its scan found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct EdgeScan {
    pub min_x: Option<u32>,
    pub max_x: Option<u32>,
    pub min_y: Option<u32>,
    pub max_y: Option<u32>,
}

/// Inclusive pixel rectangle with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

impl PixelRect {
    /// Horizontal span `max.x - min.x`.
    pub fn width(&self) -> u32 {
        self.max.x - self.min.x
    }

    /// Vertical span `max.y - min.y`.
    pub fn height(&self) -> u32 {
        self.max.y - self.min.y
    }

    pub fn max_span(&self) -> u32 {
        self.width().max(self.height())
    }

    /// Exclusive far corner, for half-open cropping.
    pub fn end_exclusive(&self) -> PixelPoint {
        PixelPoint::new(self.max.x + 1, self.max.y + 1)
    }
}

impl EdgeScan {
    /// Rectangle when all four scans hit and both spans are positive.
    ///
    /// Spans are computed in signed arithmetic from found bounds only, so an
    /// empty frame can never wrap around.
    pub fn rect(&self) -> Option<PixelRect> {
        let (min_x, max_x) = (self.min_x?, self.max_x?);
        let (min_y, max_y) = (self.min_y?, self.max_y?);
        let w = i64::from(max_x) - i64::from(min_x);
        let h = i64::from(max_y) - i64::from(min_y);
        if w <= 0 || h <= 0 {
            return None;
        }
        Some(PixelRect {
            min: PixelPoint::new(min_x, min_y),
            max: PixelPoint::new(max_x, max_y),
        })
    }
}

/// Scan the full frame for pixels matching `border` within `tol`.
///
/// Each edge is found by its own raster pass that stops at the first hit:
/// columns left to right, columns right to left, rows top to bottom and rows
/// bottom to top.
pub fn scan_border_extent(frame: &RgbaImage, border: Color, tol: ChannelTolerance) -> EdgeScan {
    let (w, h) = frame.dimensions();
    let hit = |x: u32, y: u32| colors_match(*frame.get_pixel(x, y), border, tol);
    let column_has = |x: u32| (0..h).any(|y| hit(x, y));
    let row_has = |y: u32| (0..w).any(|x| hit(x, y));

    EdgeScan {
        min_x: (0..w).find(|&x| column_has(x)),
        max_x: (0..w).rev().find(|&x| column_has(x)),
        min_y: (0..h).find(|&y| row_has(y)),
        max_y: (0..h).rev().find(|&y| row_has(y)),
    }
}
