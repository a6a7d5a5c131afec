//! Pinhole inverse projection: apparent size to range.
//!
//! A pad of world radius `R` seen at distance `D` by a camera with vertical
//! field of view `F` on a `V`-pixel viewport spans
//! `d = V * R / (D * tan(F / 2))` pixels, so `D = R * (V / d) / tan(F / 2)`.

use std::f64::consts::PI;

/// Distance for a pad spanning `apparent_px` pixels.
///
/// Returns `None` for non-positive sizes or a field of view outside `(0, pi)`.
pub fn distance_from_apparent_size(
    viewport_px: f64,
    apparent_px: f64,
    fov_rad: f64,
    pad_radius: f64,
) -> Option<f64> {
    if !(apparent_px > 0.0 && viewport_px > 0.0 && fov_rad > 0.0 && fov_rad < PI) {
        return None;
    }
    let half_tan = (fov_rad / 2.0).tan();
    let d = pad_radius * (viewport_px / apparent_px) / half_tan;
    d.is_finite().then_some(d)
}

/// Apparent pad diameter in pixels at `distance` (inverse of the above).
pub fn apparent_size_at_distance(
    viewport_px: f64,
    distance: f64,
    fov_rad: f64,
    pad_radius: f64,
) -> Option<f64> {
    distance_from_apparent_size(viewport_px, distance, fov_rad, pad_radius)
}
