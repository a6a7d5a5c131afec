//! Snapshot artifacts for a single frame.
//!
//! A snapshot is the cropped working image, its annotated copy and a small
//! versioned JSON record of the estimate. Writing is best effort: failures
//! are logged and never affect the estimate.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::estimator::DistanceEstimate;
use crate::region::ImageRegion;

pub const SNAPSHOT_SCHEMA_V1: &str = "padrange.snapshot.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub schema_version: String,
    pub frame_index: usize,
    /// Crop size in pixels.
    pub width: u32,
    pub height: u32,
    pub images: [String; 2],
    pub estimate: DistanceEstimate,
}

/// Writes `<prefix>_<index>.png`, `<prefix>_<index>_annotated.png` and
/// `<prefix>_<index>.json` into a directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    prefix: String,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Write one snapshot. Returns the image paths, or `None` on failure.
    pub fn write(
        &self,
        region: &ImageRegion,
        index: usize,
        estimate: &DistanceEstimate,
    ) -> Option<[PathBuf; 2]> {
        match self.try_write(region, index, estimate) {
            Ok(paths) => {
                tracing::info!(
                    index,
                    path = %paths[0].display(),
                    "snapshot written"
                );
                Some(paths)
            }
            Err(err) => {
                tracing::warn!(index, dir = %self.dir.display(), "snapshot failed: {err}");
                None
            }
        }
    }

    fn try_write(
        &self,
        region: &ImageRegion,
        index: usize,
        estimate: &DistanceEstimate,
    ) -> Result<[PathBuf; 2], Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.dir)?;
        let stem = format!("{}_{:05}", self.prefix, index);
        let paths = region.save_pair(&self.dir, &stem)?;

        let record = SnapshotRecord {
            schema_version: SNAPSHOT_SCHEMA_V1.to_string(),
            frame_index: index,
            width: region.width(),
            height: region.height(),
            images: paths.clone().map(|p| p.display().to_string()),
            estimate: estimate.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(self.dir.join(format!("{stem}.json")), json)?;
        Ok(paths)
    }
}
