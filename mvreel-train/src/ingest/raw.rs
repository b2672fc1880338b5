//! Raw, un-normalized scene content as handed over by a loader.

use crate::scene::Split;
use glam::DMat4;
use mvreel_data::{FrameStack, Intrinsics, Modality, PointCloud};
use std::collections::BTreeMap;

/// One camera as read from disk, before normalization.
///
/// `intrinsics`, `width` and `height` describe the full-resolution sensor; the
/// normalizer scales them by the configured sub-sampling factor. Payloads must
/// already be at the sub-sampled resolution.
#[derive(Debug, Clone)]
pub struct RawCamera {
    pub camera_idx: usize,
    /// Camera-to-world pose in the format's native axis convention.
    pub pose: DMat4,
    pub intrinsics: Intrinsics,
    pub width: u32,
    pub height: u32,
    /// Split declared by the source data (manifest formats).
    pub split: Option<Split>,
    pub payloads: BTreeMap<Modality, FrameStack>,
    pub timestamps: Option<Vec<f64>>,
}

impl RawCamera {
    pub fn new(camera_idx: usize, pose: DMat4, intrinsics: Intrinsics, width: u32, height: u32) -> Self {
        Self {
            camera_idx,
            pose,
            intrinsics,
            width,
            height,
            split: None,
            payloads: BTreeMap::new(),
            timestamps: None,
        }
    }

    pub fn with_split(mut self, split: Split) -> Self {
        self.split = Some(split);
        self
    }

    pub fn with_frames(mut self, modality: Modality, frames: FrameStack) -> Self {
        self.payloads.insert(modality, frames);
        self
    }

    pub fn with_timestamps(mut self, timestamps: Vec<f64>) -> Self {
        self.timestamps = Some(timestamps);
        self
    }
}

/// Everything a loader read for one scene.
#[derive(Debug, Clone, Default)]
pub struct RawScene {
    /// Cameras in captured order.
    pub cameras: Vec<RawCamera>,
    /// Scene geometry in the same frame as the raw poses.
    pub point_clouds: Vec<PointCloud>,
}
