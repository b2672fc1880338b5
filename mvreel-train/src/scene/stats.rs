//! Scene-scale statistics derived from raw camera positions.

use glam::DMat4;
use serde::Serialize;

/// Guards the scale multiplier against near-zero-radius rigs.
pub const SCALE_EPS: f64 = 1e-2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneStats {
    /// Smallest camera distance from the world origin, before normalization.
    pub min_camera_distance: f64,
    /// Largest camera distance from the world origin, before normalization.
    pub max_camera_distance: f64,
    /// `max_camera_distance` rounded to two decimals.
    pub scene_scale: f64,
    /// Isotropic scale folded into the global transform.
    pub scale_mult: f64,
}

impl SceneStats {
    /// Distances of every camera center to the origin. `None` for an empty rig.
    pub fn camera_distances<'a>(
        poses: impl IntoIterator<Item = &'a DMat4>,
    ) -> Option<(f64, f64)> {
        poses
            .into_iter()
            .map(|pose| pose.w_axis.truncate().length())
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }

    pub fn new(min_camera_distance: f64, max_camera_distance: f64, scale_mult: f64) -> Self {
        Self {
            min_camera_distance,
            max_camera_distance,
            scene_scale: round2(max_camera_distance),
            scale_mult,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
