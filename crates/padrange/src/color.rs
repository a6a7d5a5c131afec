//! Tolerance-based approximate color equality.
//!
//! Rendering and texture filtering make colors approximate, so every color
//! decision in the analysis funnels through [`colors_match`].

use image::Rgba;

/// 8-bit RGBA color as stored in frame buffers.
pub type Color = Rgba<u8>;

/// Alpha tolerance that accepts every alpha difference.
pub const ALPHA_ANY: u16 = 256;

/// Per-channel strict-inequality thresholds.
///
/// Two channel values match when their absolute difference is strictly below
/// the threshold, so a zero tolerance never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChannelTolerance {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl ChannelTolerance {
    /// Same threshold on the color channels; alpha always passes.
    pub const fn uniform(t: u16) -> Self {
        Self {
            r: t,
            g: t,
            b: t,
            a: ALPHA_ANY,
        }
    }

    /// Explicit threshold on all four channels.
    pub const fn rgba(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for ChannelTolerance {
    fn default() -> Self {
        Self::uniform(30)
    }
}

#[inline]
fn channel_within(a: u8, b: u8, tol: u16) -> bool {
    u16::from(a.abs_diff(b)) < tol
}

/// Approximate color equality: every channel differs by less than its tolerance.
#[inline]
pub fn colors_match(a: Color, b: Color, tol: ChannelTolerance) -> bool {
    channel_within(a[0], b[0], tol.r)
        && channel_within(a[1], b[1], tol.g)
        && channel_within(a[2], b[2], tol.b)
        && channel_within(a[3], b[3], tol.a)
}

/// Build a color from a `[r, g, b, a]` array (the serialized form used in configs).
#[inline]
pub const fn rgba(c: [u8; 4]) -> Color {
    Rgba(c)
}
