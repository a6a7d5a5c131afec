//! Lattice value noise for texture perturbation.

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Per-channel noise amplitude and the seed of the lattice offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Peak perturbation per channel (RGBA).
    pub magnitude: [u8; 4],
    pub seed: u64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            magnitude: [24, 24, 24, 0],
            seed: 0,
        }
    }
}

fn mix_a(mut x: u32) -> u32 {
    x = ((x >> 16) ^ x).wrapping_mul(0x045d_9f3b);
    x = ((x >> 16) ^ x).wrapping_mul(0x045d_9f3b);
    (x >> 16) ^ x
}

fn mix_b(mut x: u32) -> u32 {
    x ^= x >> 15;
    x = x.wrapping_mul(0x2c1b_3c6d);
    x ^= x >> 12;
    x = x.wrapping_mul(0x297a_2d39);
    x ^ (x >> 15)
}

/// Lattice value in `[0, 1]`.
fn lattice(x: i32, y: i32) -> f32 {
    mix_a(mix_a(x as u32) ^ mix_b(y as u32)) as f32 / u32::MAX as f32
}

/// Bilinearly interpolated lattice noise in `[0, 1]`.
pub fn value_noise(x: f32, y: f32) -> f32 {
    let (x0, y0) = (x.floor(), y.floor());
    let (tx, ty) = (x - x0, y - y0);
    let (xi, yi) = (x0 as i32, y0 as i32);
    let top = lattice(xi, yi) * (1.0 - tx) + lattice(xi + 1, yi) * tx;
    let bottom = lattice(xi, yi + 1) * (1.0 - tx) + lattice(xi + 1, yi + 1) * tx;
    top * (1.0 - ty) + bottom * ty
}

/// Add two octaves of centered value noise to every channel, saturating at
/// 0 and 255.
pub fn apply_noise(img: &mut RgbaImage, params: &NoiseParams) {
    let mut rng = StdRng::seed_from_u64(params.seed);
    // Independent lattice offsets per channel and octave.
    let offsets: [[f32; 4]; 4] = std::array::from_fn(|_| {
        std::array::from_fn(|_| rng.gen_range(0.0f32..1000.0))
    });

    for (x, y, px) in img.enumerate_pixels_mut() {
        let (fx, fy) = (x as f32, y as f32);
        for (ch, value) in px.0.iter_mut().enumerate() {
            let mag = f32::from(params.magnitude[ch]);
            if mag == 0.0 {
                continue;
            }
            let o = offsets[ch];
            let n = value_noise(o[0] + fx / 100.0, o[1] + fy / 100.0)
                + 0.5 * value_noise(o[2] + fx / 200.0, o[3] + fy / 200.0);
            // n is in [0, 1.5]; center it so the mean color is preserved.
            let delta = (mag * (n - 0.75) / 0.75).round() as i16;
            *value = (i16::from(*value) + delta).clamp(0, 255) as u8;
        }
    }
}
