//! Landing-pad texture synthesis.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::noise::{apply_noise, NoiseParams};

/// Appearance of the pad texture.
///
/// The texture is a disk inscribed in the square image: `fill` inside, a
/// `border` ring of `stroke_weight` texels (approximately) at the rim and
/// `background` in the corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadTextureStyle {
    /// Texture side in texels.
    pub size: u32,
    pub fill: [u8; 4],
    pub border: [u8; 4],
    pub stroke_weight: u32,
    /// Corner color; transparent by default so the clear color shows through.
    pub background: [u8; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseParams>,
}

impl Default for PadTextureStyle {
    fn default() -> Self {
        Self {
            size: 1024,
            fill: [200, 150, 0, 255],
            border: [0, 0, 0, 255],
            stroke_weight: 100,
            background: [0, 0, 0, 0],
            noise: None,
        }
    }
}

impl PadTextureStyle {
    pub fn validate(&self) -> Result<(), String> {
        if self.size < 2 {
            return Err(format!("texture size must be at least 2, got {}", self.size));
        }
        if self.stroke_weight == 0 {
            return Err("stroke_weight must be positive".to_string());
        }
        Ok(())
    }

    /// Border band thickness as a fraction of the pad radius.
    pub fn border_fraction(&self) -> f64 {
        1.0 - (1.0 - self.stroke_fraction_squared()).max(0.0).sqrt()
    }

    /// Band width in squared normalized radius.
    fn stroke_fraction_squared(&self) -> f64 {
        0.5 * f64::from(self.stroke_weight) / f64::from(self.size)
    }
}

/// Paint the pad texture described by `style`.
pub fn render_pad_texture(style: &PadTextureStyle) -> RgbaImage {
    let size = style.size.max(2);
    let fs = style.stroke_fraction_squared();
    let s = f64::from(size);
    let (fill, border, background) = (Rgba(style.fill), Rgba(style.border), Rgba(style.background));

    let mut img = RgbaImage::from_fn(size, size, |x, y| {
        let u = 2.0 * (f64::from(x) / s - 0.5);
        let v = 2.0 * (f64::from(y) / s - 0.5);
        let r2 = u * u + v * v;
        if r2 > 1.0 {
            background
        } else if r2 < 1.0 - fs {
            fill
        } else {
            border
        }
    });
    if let Some(noise) = &style.noise {
        apply_noise(&mut img, noise);
    }
    img
}
