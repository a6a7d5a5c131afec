use crate::color::{ChannelTolerance, Color};
use crate::geom::PixelPoint;
use crate::region::ImageRegion;

/// What lies in the +x direction from a point at the top of the pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AxisOrientation {
    /// The fill keeps widening on both sides of the scan row: following the
    /// contour toward +x leads to the major-axis endpoint.
    Major,
    /// The scan hits the border first: +x leads toward the minor-axis side.
    Minor,
}

impl AxisOrientation {
    pub fn is_major(self) -> bool {
        matches!(self, Self::Major)
    }
}

/// Classify the +x direction from `top`, a pad pixel at or near the pad's top.
///
/// Scans right along `top.y` starting at `top.x + 1`. A border pixel means
/// [`AxisOrientation::Minor`]; a column whose pixels directly above and below
/// are both pad fill means [`AxisOrientation::Major`]. Returns `None` when
/// `top` is within two rows of the top or bottom edge, or the scan reaches
/// the region edge undecided.
pub fn classify_orientation(
    region: &mut ImageRegion,
    top: PixelPoint,
    pad: Color,
    border: Color,
    tol: ChannelTolerance,
    annotation: Color,
) -> Option<AxisOrientation> {
    if !region.in_range(top) || top.y <= 1 || top.y >= region.height().saturating_sub(2) {
        return None;
    }
    let y = top.y;
    for x in top.x + 1..region.width() {
        let here = PixelPoint::new(x, y);
        if region.pixel_matches(here, border, tol) {
            return Some(AxisOrientation::Minor);
        }
        if region.pixel_matches(PixelPoint::new(x, y + 1), pad, tol)
            && region.pixel_matches(PixelPoint::new(x, y - 1), pad, tol)
        {
            return Some(AxisOrientation::Major);
        }
        region.annotate(here, annotation);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Direction;
    use crate::test_utils::{pad_frame, BACKGROUND, BORDER, PAD};
    use crate::trace::linear_search;
    use image::Rgba;

    const MARK: Color = Rgba([255, 255, 0, 255]);

    fn top_of(region: &mut ImageRegion, x: u32) -> PixelPoint {
        let tol = ChannelTolerance::uniform(10);
        linear_search(region, PixelPoint::new(x, 0), Direction::DOWN, PAD, tol, MARK)
            .expect("pad below scan column")
    }

    #[test]
    fn axis_aligned_top_hits_border() {
        let frame = pad_frame(100, 60, [50.0, 30.0], [45.0, 25.0], 0.0, 3.0);
        let mut region = ImageRegion::from_working(frame, false);
        let top = top_of(&mut region, 50);
        let tol = ChannelTolerance::uniform(10);
        assert_eq!(
            classify_orientation(&mut region, top, PAD, BORDER, tol, MARK),
            Some(AxisOrientation::Minor)
        );
    }

    #[test]
    fn rising_contour_to_the_right_is_major() {
        // Major axis tilted so that the pad's highest point lies right of center.
        let angle = -35f64.to_radians();
        let frame = pad_frame(120, 120, [60.0, 60.0], [55.0, 20.0], angle, 3.0);
        let mut region = ImageRegion::from_working(frame, false);
        let top = top_of(&mut region, 60);
        let tol = ChannelTolerance::uniform(10);
        assert_eq!(
            classify_orientation(&mut region, top, PAD, BORDER, tol, MARK),
            Some(AxisOrientation::Major)
        );
    }

    #[test]
    fn rejects_points_near_vertical_edges() {
        let frame = pad_frame(40, 40, [20.0, 20.0], [18.0, 18.0], 0.0, 2.0);
        let mut region = ImageRegion::from_working(frame, false);
        let tol = ChannelTolerance::uniform(10);
        for y in [0, 1, 38, 39] {
            assert_eq!(
                classify_orientation(&mut region, PixelPoint::new(20, y), PAD, BORDER, tol, MARK),
                None
            );
        }
    }

    #[test]
    fn undecided_scan_fails() {
        let frame = image::RgbaImage::from_pixel(30, 10, BACKGROUND);
        let mut region = ImageRegion::from_working(frame, true);
        let tol = ChannelTolerance::uniform(10);
        assert_eq!(
            classify_orientation(&mut region, PixelPoint::new(3, 5), PAD, BORDER, tol, MARK),
            None
        );
        assert_eq!(*region.annotated().get_pixel(29, 5), MARK);
    }
}
