//! Cropped working buffer with a parallel annotation overlay.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::color::{colors_match, ChannelTolerance, Color};
use crate::geom::PixelPoint;

/// Errors raised when building an [`ImageRegion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// The normalized rectangle has zero width or height.
    Degenerate {
        /// Crop width after normalization.
        width: u32,
        /// Crop height after normalization.
        height: u32,
    },
    /// The rectangle extends past the source buffer.
    OutsideSource {
        /// Exclusive corner requested.
        corner: PixelPoint,
        /// Source dimensions.
        source: [u32; 2],
    },
}

impl std::fmt::Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Degenerate { width, height } => {
                write!(f, "degenerate crop: {}x{}", width, height)
            }
            Self::OutsideSource { corner, source } => write!(
                f,
                "crop corner ({}, {}) outside source {}x{}",
                corner.x, corner.y, source[0], source[1]
            ),
        }
    }
}

impl std::error::Error for RegionError {}

/// Analysis viewport into one frame.
///
/// Owns the cropped `working` pixels and an `annotated` copy used for debug
/// overlays. Both buffers always share the same positive dimensions and are
/// dropped together at the end of a detection pass.
#[derive(Debug, Clone)]
pub struct ImageRegion {
    working: RgbaImage,
    annotated: RgbaImage,
    debug_draw: bool,
}

impl ImageRegion {
    /// Crop the half-open rectangle spanned by two opposite corners.
    ///
    /// Corner order is irrelevant; zero-area rectangles are rejected.
    pub fn crop(
        source: &RgbaImage,
        a: PixelPoint,
        b: PixelPoint,
        debug_draw: bool,
    ) -> Result<Self, RegionError> {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        let width = max_x - min_x;
        let height = max_y - min_y;
        if width == 0 || height == 0 {
            return Err(RegionError::Degenerate { width, height });
        }
        let (sw, sh) = source.dimensions();
        if max_x > sw || max_y > sh {
            return Err(RegionError::OutsideSource {
                corner: PixelPoint::new(max_x, max_y),
                source: [sw, sh],
            });
        }

        let src = source.as_raw();
        let row_bytes = 4 * width as usize;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for y in min_y..max_y {
            let start = 4 * (y as usize * sw as usize + min_x as usize);
            data.extend_from_slice(&src[start..start + row_bytes]);
        }
        let working = RgbaImage::from_raw(width, height, data).ok_or(RegionError::Degenerate {
            width,
            height,
        })?;
        Ok(Self::from_working(working, debug_draw))
    }

    /// Wrap an already-cropped buffer. The annotation overlay starts as a copy.
    pub fn from_working(working: RgbaImage, debug_draw: bool) -> Self {
        let annotated = working.clone();
        Self {
            working,
            annotated,
            debug_draw,
        }
    }

    pub fn width(&self) -> u32 {
        self.working.width()
    }

    pub fn height(&self) -> u32 {
        self.working.height()
    }

    /// Center pixel (integer halves of the dimensions).
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(self.width() / 2, self.height() / 2)
    }

    pub fn debug_draw(&self) -> bool {
        self.debug_draw
    }

    pub fn working(&self) -> &RgbaImage {
        &self.working
    }

    pub fn annotated(&self) -> &RgbaImage {
        &self.annotated
    }

    #[inline]
    pub fn in_range(&self, p: PixelPoint) -> bool {
        p.x < self.width() && p.y < self.height()
    }

    #[inline]
    pub fn pixel(&self, p: PixelPoint) -> Option<Color> {
        self.in_range(p).then(|| *self.working.get_pixel(p.x, p.y))
    }

    /// `true` when `p` is in range and its color matches within tolerance.
    #[inline]
    pub fn pixel_matches(&self, p: PixelPoint, color: Color, tol: ChannelTolerance) -> bool {
        self.pixel(p).is_some_and(|c| colors_match(c, color, tol))
    }

    /// Paint `color` into the overlay when debug drawing is enabled.
    #[inline]
    pub fn annotate(&mut self, p: PixelPoint, color: Color) {
        if self.debug_draw && self.in_range(p) {
            self.annotated.put_pixel(p.x, p.y, color);
        }
    }

    /// Write `<stem>.png` and `<stem>_annotated.png` into `dir`.
    pub fn save_pair(&self, dir: &Path, stem: &str) -> image::ImageResult<[PathBuf; 2]> {
        let plain = dir.join(format!("{stem}.png"));
        let annotated = dir.join(format!("{stem}_annotated.png"));
        self.working.save(&plain)?;
        self.annotated.save(&annotated)?;
        Ok([plain, annotated])
    }
}
