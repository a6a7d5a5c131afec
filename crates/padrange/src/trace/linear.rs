use crate::color::{ChannelTolerance, Color};
use crate::geom::{Direction, PixelPoint};
use crate::region::ImageRegion;

/// March from `start` by `step` until a pixel matches `target`.
///
/// Every visited non-matching pixel is annotated. Returns the first matching
/// point, or `None` once the march leaves the region (or cannot move).
pub fn linear_search(
    region: &mut ImageRegion,
    start: PixelPoint,
    step: Direction,
    target: Color,
    tol: ChannelTolerance,
    annotation: Color,
) -> Option<PixelPoint> {
    let mut at = start;
    loop {
        if !region.in_range(at) {
            return None;
        }
        if region.pixel_matches(at, target, tol) {
            return Some(at);
        }
        region.annotate(at, annotation);
        if step == Direction::default() {
            return None;
        }
        at = at.checked_step(step)?;
    }
}
