//! Per-frame distance pipeline.
//!
//! Stages:
//! 1. **Scan** the full frame for the border's bounding box (none: accuracy 0).
//! 2. **Crop** to the box and compute the coarse bounding-box estimate.
//! 3. **Top search** down the crop's middle column to the pad fill.
//! 4. **Orientation** at the top point selects the trace direction.
//! 5. **Trace** to the first axis endpoint, mirror it through the crop center,
//!    snap back onto the fill and trace the opposite endpoint.
//! 6. **Refine** the first endpoint against the second.
//!
//! Any failure in 3 to 6, or a traced diameter the bounding box rules out,
//! keeps the coarse estimate (accuracy 1).

use image::RgbaImage;

use crate::color::{rgba, ChannelTolerance, Color};
use crate::geom::{Direction, PixelPoint};
use crate::region::ImageRegion;
use crate::scan::scan_border_extent;
use crate::trace::{
    classify_orientation, linear_search, trace_border, BorderTrace, RotationSense, TraceError,
    TraceParams,
};

use super::config::EstimatorConfig;
use super::projection::distance_from_apparent_size;
use super::result::{Accuracy, DistanceEstimate, Stage, StageSummary};

/// Colors and limits resolved once per frame from the config.
struct Palette {
    pad: Color,
    border: Color,
    tol: ChannelTolerance,
    mark_linear: Color,
    mark_orientation: Color,
    mark_border: Color,
}

impl Palette {
    fn new(config: &EstimatorConfig) -> Self {
        Self {
            pad: config.pad(),
            border: config.border(),
            tol: config.channel_tolerance(),
            mark_linear: rgba(config.annotations.linear_search),
            mark_orientation: rgba(config.annotations.orientation),
            mark_border: rgba(config.annotations.border_trace),
        }
    }
}

/// Axis endpoints found by the refinement stages, in crop coordinates.
struct Endpoints {
    a: PixelPoint,
    b: PixelPoint,
}

/// Run the pipeline on one frame.
///
/// Returns the estimate and, when the crop succeeded, the analysed region
/// (with annotations drawn if `snapshot` is set and annotations are enabled).
pub(crate) fn estimate_distance(
    frame: &RgbaImage,
    config: &EstimatorConfig,
    snapshot: bool,
) -> (DistanceEstimate, Option<ImageRegion>) {
    let palette = Palette::new(config);
    let viewport = f64::from(config.viewport_px);

    let scan = scan_border_extent(frame, palette.border, palette.tol);
    let Some(rect) = scan.rect() else {
        tracing::debug!(?scan, "no border pixels in frame");
        return (DistanceEstimate::undetected(), None);
    };
    tracing::debug!(
        min_x = rect.min.x,
        min_y = rect.min.y,
        max_x = rect.max.x,
        max_y = rect.max.y,
        "border bounding box"
    );

    let mut stages = StageSummary {
        bounding_box: Some(rect),
        ..Default::default()
    };
    let span = f64::from(rect.max_span());
    let coarse = distance_from_apparent_size(viewport, span, config.fov_rad, config.pad_radius);

    let debug_draw = snapshot && config.annotations.enabled;
    let mut region = match ImageRegion::crop(frame, rect.min, rect.end_exclusive(), debug_draw) {
        Ok(region) => region,
        Err(err) => {
            tracing::debug!(%err, "crop failed");
            stages.failed_stage = Some(Stage::Crop);
            stages.diameter_px = Some(span);
            return (coarse_estimate(coarse, stages), None);
        }
    };

    match refine(&mut region, config, &palette, &mut stages) {
        Ok(ends) => {
            let diameter = (ends.a.distance_squared(ends.b) as f64).sqrt();
            stages.endpoints = Some([ends.a, ends.b]);
            stages.diameter_px = Some(diameter);
            // Rows of border above the top point approximate the band width.
            let band = stages.top.map_or(0.0, |t| f64::from(t.y));
            let distance = if plausible_diameter(diameter, span, band) {
                distance_from_apparent_size(viewport, diameter, config.fov_rad, config.pad_radius)
            } else {
                tracing::debug!(diameter, span, band, "traced diameter shorter than box");
                None
            };
            match distance {
                Some(d) => {
                    tracing::debug!(diameter, distance = d, "refined estimate");
                    let estimate = DistanceEstimate {
                        accuracy: Accuracy::Refined,
                        distance: Some(d),
                        stages,
                    };
                    (estimate, Some(region))
                }
                None => {
                    stages.failed_stage = Some(Stage::Diameter);
                    stages.diameter_px = Some(span);
                    (coarse_estimate(coarse, stages), Some(region))
                }
            }
        }
        Err(stage) => {
            tracing::debug!(?stage, "refinement failed, using bounding box");
            stages.failed_stage = Some(stage);
            stages.diameter_px = Some(span);
            (coarse_estimate(coarse, stages), Some(region))
        }
    }
}

fn coarse_estimate(distance: Option<f64>, stages: StageSummary) -> DistanceEstimate {
    DistanceEstimate {
        accuracy: Accuracy::Coarse,
        distance,
        stages,
    }
}

/// Stages 3 to 6 on the cropped region.
fn refine(
    region: &mut ImageRegion,
    config: &EstimatorConfig,
    palette: &Palette,
    stages: &mut StageSummary,
) -> Result<Endpoints, Stage> {
    let start = PixelPoint::new(region.width() / 2, 0);
    let top = linear_search(
        region,
        start,
        Direction::DOWN,
        palette.pad,
        palette.tol,
        palette.mark_linear,
    )
    .ok_or(Stage::TopSearch)?;
    stages.top = Some(top);
    tracing::debug!(x = top.x, y = top.y, "pad top");

    let orientation = classify_orientation(
        region,
        top,
        palette.pad,
        palette.border,
        palette.tol,
        palette.mark_orientation,
    )
    .ok_or(Stage::Orientation)?;
    stages.orientation = Some(orientation);
    let sense = if orientation.is_major() {
        RotationSense::Clockwise
    } else {
        RotationSense::CounterClockwise
    };
    tracing::debug!(?orientation, ?sense, "axis orientation");

    let params = |center: PixelPoint| TraceParams {
        center,
        sense,
        find_minimum: false,
        step_budget: config.trace.step_budget,
        step_ceiling: config.trace.step_ceiling,
        border: palette.border,
        tol: palette.tol,
        annotation: palette.mark_border,
    };

    let center = region.center();
    let first = trace_farthest(region, top, &params(center)).map_err(|err| {
        tracing::debug!(%err, "first endpoint trace failed");
        Stage::FirstTrace
    })?;

    let guess = mirror_through(first.best, center, region.width(), region.height());
    let toward_center = (center - guess).signum();
    let snapped = linear_search(
        region,
        guess,
        toward_center,
        palette.pad,
        palette.tol,
        palette.mark_linear,
    )
    .ok_or(Stage::OppositeSnap)?;

    let mut opposite_params = params(center);
    opposite_params.sense = sense.reversed();
    let opposite = trace_farthest(region, snapped, &opposite_params).map_err(|err| {
        tracing::debug!(%err, "opposite endpoint trace failed");
        Stage::OppositeTrace
    })?;

    let refined = trace_farthest(region, first.best, &params(opposite.best)).map_err(|err| {
        tracing::debug!(%err, "endpoint refinement failed");
        Stage::Refine
    })?;
    tracing::debug!(
        a_x = refined.best.x,
        a_y = refined.best.y,
        b_x = opposite.best.x,
        b_y = opposite.best.y,
        "axis endpoints"
    );

    if refined.best == opposite.best {
        return Err(Stage::Diameter);
    }
    Ok(Endpoints {
        a: refined.best,
        b: opposite.best,
    })
}

/// Trace toward the largest radius; a walk that never gets past `start`
/// headed downhill, so it is repeated in the reverse sense.
fn trace_farthest(
    region: &mut ImageRegion,
    start: PixelPoint,
    params: &TraceParams,
) -> Result<BorderTrace, TraceError> {
    let forward = trace_border(region, start, params)?;
    if forward.best != start {
        return Ok(forward);
    }
    let reverse = TraceParams {
        sense: params.sense.reversed(),
        ..*params
    };
    tracing::trace!(sense = ?reverse.sense, "no improvement past start, retracing");
    let backward = trace_border(region, start, &reverse)?;
    Ok(if backward.radius_squared > forward.radius_squared {
        backward
    } else {
        forward
    })
}

/// `false` when the traced diameter is clearly shorter than the bounding
/// box allows. Any chord of an ellipse is at most its major axis, so the
/// inner-edge diameter can only fall short of `span` by about two bands.
fn plausible_diameter(diameter: f64, span: f64, band: f64) -> bool {
    let slack = (0.03 * span).max(4.0);
    diameter + 2.0 * band + slack >= span
}

/// Reflect `p` through `center`, clamped into a `w` x `h` region.
fn mirror_through(p: PixelPoint, center: PixelPoint, w: u32, h: u32) -> PixelPoint {
    let x = (2 * i64::from(center.x) - i64::from(p.x)).clamp(0, i64::from(w) - 1);
    let y = (2 * i64::from(center.y) - i64::from(p.y)).clamp(0, i64::from(h) - 1);
    PixelPoint::new(x as u32, y as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::AxisOrientation;
    use crate::test_utils::{circle_pad_frame, disk_frame, pad_frame, BACKGROUND, BORDER, PAD};
    use imageproc::drawing::draw_filled_ellipse_mut;
    use std::f64::consts::FRAC_PI_2;

    fn config(viewport_px: u32) -> EstimatorConfig {
        EstimatorConfig {
            viewport_px,
            fov_rad: FRAC_PI_2,
            tolerance: 10,
            ..Default::default()
        }
    }

    #[test]
    fn centered_circle_recovers_distance() {
        let (v, r) = (400u32, 150.0f64);
        let frame = circle_pad_frame(v, r, 3.0);
        let cfg = config(v);
        let (est, region) = estimate_distance(&frame, &cfg, false);
        assert_eq!(est.accuracy, Accuracy::Refined);
        let expected = (f64::from(v) / (2.0 * r)) / (cfg.fov_rad / 2.0).tan();
        let got = est.distance.unwrap();
        assert!(
            (got - expected).abs() / expected < 0.05,
            "got {got}, expected {expected}"
        );
        assert!(region.is_some());
    }

    #[test]
    fn rotated_ellipse_uses_major_axis() {
        let frame = pad_frame(300, 300, [150.0, 150.0], [120.0, 60.0], 30f64.to_radians(), 3.0);
        let (est, _) = estimate_distance(&frame, &config(300), false);
        assert_eq!(est.accuracy, Accuracy::Refined);
        let d = est.stages.diameter_px.unwrap();
        assert!((d - 234.0).abs() / 234.0 < 0.03, "diameter {d}");
        assert_eq!(est.stages.orientation, Some(AxisOrientation::Minor));
    }

    #[test]
    fn drawn_ellipse_is_refined() {
        let mut frame = RgbaImage::from_pixel(240, 240, BACKGROUND);
        draw_filled_ellipse_mut(&mut frame, (120, 120), 90, 50, BORDER);
        draw_filled_ellipse_mut(&mut frame, (120, 120), 86, 46, PAD);
        let (est, _) = estimate_distance(&frame, &config(240), false);
        assert_eq!(est.accuracy, Accuracy::Refined);
        let d = est.stages.diameter_px.unwrap();
        assert!((d - 172.0).abs() < 8.0, "diameter {d}");
    }

    #[test]
    fn border_without_fill_is_coarse() {
        let frame = disk_frame(100, 100, (50, 50), 30, BORDER);
        let (est, _) = estimate_distance(&frame, &config(100), false);
        assert_eq!(est.accuracy, Accuracy::Coarse);
        assert_eq!(est.stages.failed_stage, Some(Stage::TopSearch));
        // Span 60 px in a 100 px viewport at 90 degrees.
        let d = est.distance.unwrap();
        assert!((d - 100.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn top_on_crop_edge_is_coarse() {
        // One-pixel band puts the first fill row at crop y = 1.
        let frame = circle_pad_frame(100, 40.0, 1.0);
        let (est, _) = estimate_distance(&frame, &config(100), false);
        assert_eq!(est.accuracy, Accuracy::Coarse);
        assert_eq!(est.stages.failed_stage, Some(Stage::Orientation));
        assert!(est.distance.is_some());
    }

    /// Accuracy 1 distance from the recorded bounding box.
    fn box_distance(est: &DistanceEstimate, viewport_px: u32) -> Option<f64> {
        let rect = est.stages.bounding_box?;
        distance_from_apparent_size(
            f64::from(viewport_px),
            f64::from(rect.max_span()),
            FRAC_PI_2,
            1.0,
        )
    }

    #[test]
    fn near_circular_ellipse_never_refines_minor_axis() {
        let angles = (0..=12).map(|i| f64::from(i) * 15.0).chain([170.0]);
        for deg in angles {
            let frame = pad_frame(300, 300, [150.0, 150.0], [120.0, 96.0], deg.to_radians(), 3.0);
            let (est, _) = estimate_distance(&frame, &config(300), false);
            match est.accuracy {
                Accuracy::Refined => {
                    let d = est.stages.diameter_px.unwrap();
                    assert!(d >= 0.94 * 234.0 && d <= 236.0, "angle {deg}: diameter {d}");
                }
                Accuracy::Coarse => {
                    assert_eq!(est.distance, box_distance(&est, 300), "angle {deg}");
                }
                Accuracy::None => panic!("angle {deg}: pad not detected"),
            }
        }
    }

    #[test]
    fn short_diameter_is_rejected() {
        assert!(plausible_diameter(232.0, 238.0, 3.0));
        assert!(!plausible_diameter(190.0, 238.0, 3.0));
        assert!(plausible_diameter(97.0, 100.0, 0.0));
    }

    #[test]
    fn step_ceiling_degrades_to_bounding_box() {
        let frame = circle_pad_frame(200, 70.0, 3.0);
        let mut cfg = config(200);
        cfg.trace.step_ceiling = Some(1);
        let (est, _) = estimate_distance(&frame, &cfg, false);
        assert_eq!(est.accuracy, Accuracy::Coarse);
        assert_eq!(est.stages.failed_stage, Some(Stage::FirstTrace));
        assert_eq!(est.distance, box_distance(&est, 200));
        assert!(est.distance.is_some());
    }

    #[test]
    fn lost_contour_degrades_to_bounding_box() {
        // Only the upper cap of the band remains, so the walk runs off the crop.
        let mut frame = circle_pad_frame(200, 70.0, 3.0);
        for (_, y, px) in frame.enumerate_pixels_mut() {
            if y >= 80 && *px == BORDER {
                *px = BACKGROUND;
            }
        }
        let (est, _) = estimate_distance(&frame, &config(200), false);
        assert_eq!(est.accuracy, Accuracy::Coarse);
        assert!(
            matches!(
                est.stages.failed_stage,
                Some(Stage::FirstTrace | Stage::OppositeTrace | Stage::Refine)
            ),
            "failed at {:?}",
            est.stages.failed_stage
        );
        assert_eq!(est.distance, box_distance(&est, 200));
    }

    #[test]
    fn empty_frame_is_undetected() {
        let frame = RgbaImage::from_pixel(64, 64, BACKGROUND);
        let (est, region) = estimate_distance(&frame, &config(64), true);
        assert_eq!(est, DistanceEstimate::undetected());
        assert!(region.is_none());
    }

    #[test]
    fn snapshot_draws_annotations() {
        let frame = circle_pad_frame(200, 70.0, 3.0);
        let (_, region) = estimate_distance(&frame, &config(200), true);
        let region = region.unwrap();
        assert!(region.debug_draw());
        assert_ne!(region.working(), region.annotated());

        let (_, region) = estimate_distance(&frame, &config(200), false);
        let region = region.unwrap();
        assert_eq!(region.working(), region.annotated());
    }

    #[test]
    fn mirror_clamps_to_region() {
        let c = PixelPoint::new(10, 10);
        assert_eq!(mirror_through(PixelPoint::new(2, 5), c, 21, 21), PixelPoint::new(18, 15));
        assert_eq!(mirror_through(PixelPoint::new(0, 0), c, 15, 15), PixelPoint::new(14, 14));
    }
}
