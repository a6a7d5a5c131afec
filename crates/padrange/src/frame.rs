//! Frame sources and the per-frame estimation loop.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use image::RgbaImage;

use crate::debug_dump::SnapshotWriter;
use crate::estimator::{DistanceReport, Estimator};

/// Pressed-control bitmask for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Controls(u8);

impl Controls {
    pub const NONE: Self = Self(0);
    pub const RIGHT: Self = Self(1 << 0);
    pub const LEFT: Self = Self(1 << 1);
    pub const FORWARDS: Self = Self(1 << 2);
    pub const BACKWARDS: Self = Self(1 << 3);
    pub const UP: Self = Self(1 << 4);
    pub const DOWN: Self = Self(1 << 5);
    /// Persist the debug image pair for this frame.
    pub const SNAPSHOT: Self = Self(1 << 6);

    const NAMES: [(&'static str, Self); 7] = [
        ("right", Self::RIGHT),
        ("left", Self::LEFT),
        ("forwards", Self::FORWARDS),
        ("backwards", Self::BACKWARDS),
        ("up", Self::UP),
        ("down", Self::DOWN),
        ("snapshot", Self::SNAPSHOT),
    ];

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl std::ops::BitOr for Controls {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

/// Comma-separated control names, e.g. `forwards,up`. Empty means none.
impl FromStr for Controls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = Self::NONE;
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let lower = name.to_ascii_lowercase();
            let (_, flag) = Self::NAMES
                .iter()
                .find(|(n, _)| *n == lower)
                .ok_or_else(|| format!("unknown control '{name}'"))?;
            out = out.with(*flag);
        }
        Ok(out)
    }
}

impl fmt::Display for Controls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(n, _)| *n)
            .collect();
        write!(f, "{}", names.join(","))
    }
}

/// Input state for one frame: pressed controls and the view offsets derived
/// from the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct FrameContext {
    pub controls: Controls,
    /// Heading offset in radians.
    pub yaw: f64,
    /// Tilt offset in radians, within `[-MAX_PITCH, MAX_PITCH]`.
    pub pitch: f64,
}

impl FrameContext {
    pub const MAX_PITCH: f64 = 3.0;

    /// Build from a raw pointer position scaled by `sensitivity`.
    pub fn from_pointer(controls: Controls, pointer: [f64; 2], sensitivity: f64) -> Self {
        Self {
            controls,
            yaw: pointer[0] * sensitivity,
            pitch: (pointer[1] * sensitivity).clamp(-Self::MAX_PITCH, Self::MAX_PITCH),
        }
    }

    pub fn snapshot(&self) -> bool {
        self.controls.contains(Controls::SNAPSHOT)
    }
}

/// One captured frame plus its ground truth.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Row-major RGBA pixels, top row first.
    pub pixels: RgbaImage,
    /// Distance from the camera to the pad center in world units.
    pub actual_distance: f64,
}

/// Source of frames. Returns `None` once exhausted.
pub trait FrameProvider {
    fn next_frame(&mut self, ctx: &FrameContext) -> Option<Frame>;
}

/// Replays a fixed list of frames, ignoring the context.
#[derive(Debug, Default)]
pub struct StillFrames {
    frames: VecDeque<Frame>,
}

impl StillFrames {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameProvider for StillFrames {
    fn next_frame(&mut self, _ctx: &FrameContext) -> Option<Frame> {
        self.frames.pop_front()
    }
}

/// Result of one loop iteration.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub index: usize,
    pub report: DistanceReport,
    /// Debug image pair, when a snapshot was requested and written.
    pub snapshot: Option<[PathBuf; 2]>,
}

/// Pulls frames from a provider and estimates each one independently.
pub struct FrameLoop<P> {
    provider: P,
    estimator: Estimator,
    snapshots: Option<SnapshotWriter>,
    index: usize,
}

impl<P: FrameProvider> FrameLoop<P> {
    pub fn new(provider: P, estimator: Estimator) -> Self {
        Self {
            provider,
            estimator,
            snapshots: None,
            index: 0,
        }
    }

    /// Write debug pairs through `writer` on snapshot frames.
    pub fn with_snapshots(mut self, writer: SnapshotWriter) -> Self {
        self.snapshots = Some(writer);
        self
    }

    /// Process the next frame, or `None` when the provider is exhausted.
    pub fn tick(&mut self, ctx: &FrameContext) -> Option<FrameOutcome> {
        let frame = self.provider.next_frame(ctx)?;
        let index = self.index;
        self.index += 1;

        let (estimate, snapshot) = if ctx.snapshot() {
            let (estimate, region) = self.estimator.estimate_with_debug(&frame.pixels);
            let written = match (&self.snapshots, &region) {
                (Some(writer), Some(region)) => writer.write(region, index, &estimate),
                _ => None,
            };
            (estimate, written)
        } else {
            (self.estimator.estimate(&frame.pixels), None)
        };

        tracing::debug!(
            index,
            accuracy = estimate.accuracy.level(),
            distance = ?estimate.distance,
            actual = frame.actual_distance,
            "frame processed"
        );
        Some(FrameOutcome {
            index,
            report: DistanceReport {
                estimate,
                actual_distance: frame.actual_distance,
            },
            snapshot,
        })
    }

    /// Run one tick per context until the contexts or the frames run out.
    pub fn run<'a>(
        &mut self,
        contexts: impl IntoIterator<Item = &'a FrameContext>,
    ) -> Vec<FrameOutcome> {
        contexts
            .into_iter()
            .map_while(|ctx| self.tick(ctx))
            .collect()
    }
}
