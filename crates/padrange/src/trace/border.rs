//! Adaptive walk along the pad's border band.
//!
//! The tracer keeps its position on the innermost fill pixel next to the
//! border band. Each iteration takes one step along a primary axis (chosen
//! from the aspect-corrected slope to the center) and then re-acquires the
//! band along the secondary axis. The walk ends once `step_budget`
//! consecutive steps fail to improve the tracked extremum.

use crate::color::{ChannelTolerance, Color};
use crate::geom::{Direction, PixelPoint};
use crate::region::ImageRegion;

/// Walking direction around the center, as seen on screen (y pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RotationSense {
    /// Rightward along the top of the contour, downward along its right side.
    Clockwise,
    /// Leftward along the top of the contour, upward along its right side.
    CounterClockwise,
}

impl RotationSense {
    pub fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Inputs of one border trace.
#[derive(Debug, Clone, Copy)]
pub struct TraceParams {
    /// Reference point for the radius; must lie inside the region.
    pub center: PixelPoint,
    pub sense: RotationSense,
    /// Track the smallest radius instead of the largest.
    pub find_minimum: bool,
    /// Non-improving steps tolerated after the latest improvement.
    pub step_budget: usize,
    /// Absolute cap on steps; `None` uses `4 * (width + height)`.
    pub step_ceiling: Option<usize>,
    pub border: Color,
    pub tol: ChannelTolerance,
    pub annotation: Color,
}

/// Extremal contour point found by [`trace_border`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BorderTrace {
    pub best: PixelPoint,
    /// Squared distance from `best` to the trace center.
    pub radius_squared: u64,
    /// Steps walked before termination.
    pub steps: usize,
}

/// Reasons a border trace gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceError {
    /// `step_budget` was zero.
    ZeroBudget,
    /// The trace center lies outside the region.
    CenterOutOfRange(PixelPoint),
    /// A probed point left the region.
    ContourLost {
        /// Steps walked before the contour was lost.
        steps: usize,
    },
    /// The walk reached the absolute step cap.
    StepCeiling {
        /// Cap that was reached.
        ceiling: usize,
    },
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroBudget => write!(f, "step budget must be positive"),
            Self::CenterOutOfRange(c) => {
                write!(f, "trace center ({}, {}) out of range", c.x, c.y)
            }
            Self::ContourLost { steps } => write!(f, "contour lost after {} steps", steps),
            Self::StepCeiling { ceiling } => {
                write!(f, "step ceiling of {} reached", ceiling)
            }
        }
    }
}

impl std::error::Error for TraceError {}

/// Walk the border from `start` to the point farthest from (or nearest to)
/// `params.center`.
///
/// `start` must be a fill pixel on or next to the inner edge of the border
/// band. A continuously improving walk may run well past `step_budget`; the
/// absolute ceiling bounds it.
pub fn trace_border(
    region: &mut ImageRegion,
    start: PixelPoint,
    params: &TraceParams,
) -> Result<BorderTrace, TraceError> {
    if params.step_budget == 0 {
        return Err(TraceError::ZeroBudget);
    }
    if !region.in_range(params.center) {
        return Err(TraceError::CenterOutOfRange(params.center));
    }
    let ceiling = params
        .step_ceiling
        .unwrap_or(4 * (region.width() as usize + region.height() as usize));

    let mut best = BorderTrace {
        best: start,
        radius_squared: if params.find_minimum { u64::MAX } else { 0 },
        steps: 0,
    };
    let mut stale = 0usize;
    let mut at = start;

    for steps in 0..=ceiling {
        if !region.in_range(at) {
            return Err(TraceError::ContourLost { steps });
        }
        region.annotate(at, params.annotation);

        let delta = at - params.center;
        let r2 = delta.magnitude_squared();
        let improved = if params.find_minimum {
            r2 < best.radius_squared
        } else {
            r2 > best.radius_squared
        };
        if improved {
            best.best = at;
            best.radius_squared = r2;
            stale = 0;
        } else {
            stale += 1;
            if stale > params.step_budget {
                best.steps = steps;
                tracing::trace!(
                    steps,
                    radius_squared = best.radius_squared,
                    "border trace settled"
                );
                return Ok(best);
            }
        }

        at = advance(region, at, delta, params).ok_or(TraceError::ContourLost { steps })?;
    }

    Err(TraceError::StepCeiling { ceiling })
}

/// One primary step followed by re-acquisition of the band's inner edge.
fn advance(
    region: &ImageRegion,
    at: PixelPoint,
    delta: Direction,
    params: &TraceParams,
) -> Option<PixelPoint> {
    let w = i64::from(region.width());
    let h = i64::from(region.height());
    let clockwise = params.sense == RotationSense::Clockwise;

    let (primary, inward) = if i64::from(delta.dx).abs() * h > i64::from(delta.dy).abs() * w {
        // Left or right part of the contour: step vertically.
        let down = (delta.dx > 0) == clockwise;
        let primary = if down { Direction::DOWN } else { Direction::UP };
        let inward = if delta.dx > 0 { Direction::LEFT } else { Direction::RIGHT };
        (primary, inward)
    } else {
        // Top or bottom part: step horizontally.
        let right = (delta.dy <= 0) == clockwise;
        let primary = if right { Direction::RIGHT } else { Direction::LEFT };
        let inward = if delta.dy > 0 { Direction::UP } else { Direction::DOWN };
        (primary, inward)
    };

    let on_border = |p: PixelPoint| region.pixel_matches(p, params.border, params.tol);
    let step = |p: PixelPoint, d: Direction| {
        p.checked_step(d).filter(|q| region.in_range(*q))
    };

    let mut p = step(at, primary)?;
    if on_border(p) {
        while on_border(p) {
            p = step(p, inward)?;
        }
    } else {
        let outward = inward.negated();
        while !on_border(p) {
            p = step(p, outward)?;
        }
        p = step(p, inward)?;
    }
    Some(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{circle_pad_frame, pad_frame, BORDER};
    use image::Rgba;

    const MARK: Color = Rgba([255, 0, 255, 255]);

    fn params(center: PixelPoint, sense: RotationSense, find_minimum: bool) -> TraceParams {
        TraceParams {
            center,
            sense,
            find_minimum,
            step_budget: 20,
            step_ceiling: None,
            border: BORDER,
            tol: ChannelTolerance::uniform(10),
            annotation: MARK,
        }
    }

    /// Inner-edge pixel reached by marching from `center` along `dir`.
    fn inner_edge(region: &ImageRegion, center: PixelPoint, dir: Direction) -> PixelPoint {
        let tol = ChannelTolerance::uniform(10);
        let mut p = center;
        loop {
            let next = p.checked_step(dir).expect("stays in range");
            if region.pixel_matches(next, BORDER, tol) {
                return p;
            }
            p = next;
        }
    }

    #[test]
    fn circle_converges_to_radius_from_any_start() {
        let frame = circle_pad_frame(200, 80.0, 4.0);
        let inner = 76.0f64;
        let dirs = [
            Direction::UP,
            Direction::DOWN,
            Direction::LEFT,
            Direction::RIGHT,
            Direction::new(1, 1),
            Direction::new(-1, 1),
            Direction::new(1, -1),
            Direction::new(-1, -1),
        ];
        for dir in dirs {
            for sense in [RotationSense::Clockwise, RotationSense::CounterClockwise] {
                let mut region = ImageRegion::from_working(frame.clone(), false);
                let center = region.center();
                let start = inner_edge(&region, center, dir);
                let out = trace_border(&mut region, start, &params(center, sense, false))
                    .expect("trace succeeds");
                let r = (out.radius_squared as f64).sqrt();
                assert!(
                    (r - inner).abs() <= 2.0,
                    "dir={dir:?} sense={sense:?} r={r}"
                );
            }
        }
    }

    #[test]
    fn ellipse_max_and_min_follow_rotation_sense() {
        let frame = pad_frame(200, 140, [100.0, 70.0], [80.0, 50.0], 0.0, 4.0);
        let mut region = ImageRegion::from_working(frame, true);
        let center = PixelPoint::new(100, 70);
        let start = inner_edge(&region, center, Direction::new(1, -1));

        let far = trace_border(
            &mut region,
            start,
            &params(center, RotationSense::Clockwise, false),
        )
        .unwrap();
        assert!(((far.radius_squared as f64).sqrt() - 76.0).abs() <= 2.0);
        assert!(far.best.x > 170);

        let near = trace_border(
            &mut region,
            start,
            &params(center, RotationSense::CounterClockwise, true),
        )
        .unwrap();
        assert!(((near.radius_squared as f64).sqrt() - 46.0).abs() <= 2.0);
        assert!(near.best.y < 30);
        assert_eq!(*region.annotated().get_pixel(start.x, start.y), MARK);
    }

    #[test]
    fn rejects_zero_budget_and_bad_center() {
        let frame = circle_pad_frame(60, 25.0, 3.0);
        let mut region = ImageRegion::from_working(frame, false);
        let start = PixelPoint::new(30, 8);
        let mut p = params(region.center(), RotationSense::Clockwise, false);
        p.step_budget = 0;
        assert_eq!(
            trace_border(&mut region, start, &p),
            Err(TraceError::ZeroBudget)
        );
        let p = params(PixelPoint::new(60, 10), RotationSense::Clockwise, false);
        assert_eq!(
            trace_border(&mut region, start, &p),
            Err(TraceError::CenterOutOfRange(PixelPoint::new(60, 10)))
        );
    }

    #[test]
    fn losing_the_contour_fails() {
        // No border anywhere: the outward search runs off the region.
        let frame = image::RgbaImage::from_pixel(40, 40, Rgba([200, 150, 0, 255]));
        let mut region = ImageRegion::from_working(frame, false);
        let p = params(region.center(), RotationSense::Clockwise, false);
        assert!(matches!(
            trace_border(&mut region, PixelPoint::new(20, 5), &p),
            Err(TraceError::ContourLost { .. })
        ));
    }

    #[test]
    fn ceiling_caps_total_steps() {
        let frame = circle_pad_frame(200, 80.0, 4.0);
        let mut region = ImageRegion::from_working(frame, false);
        let center = region.center();
        let start = inner_edge(&region, center, Direction::UP);
        // Budget wider than the cap: the cap ends the walk first.
        let mut p = params(center, RotationSense::Clockwise, false);
        p.step_ceiling = Some(5);
        p.step_budget = 50;
        assert_eq!(
            trace_border(&mut region, start, &p),
            Err(TraceError::StepCeiling { ceiling: 5 })
        );
    }
}
