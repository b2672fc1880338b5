//! Normalization policies.
//!
//! Every dataset format maps onto one [`NormalizationPolicy`]: a scale mode and
//! a split policy plus the configured tilt and offsets. The policy is chosen
//! once per load and then runs the same three steps for every format:
//! scale derivation, transform composition, split assignment.

use super::config::{SceneConfig, SplitOverlap};
use super::split::{Split, Splits};
use super::stats::{SCALE_EPS, SceneStats};
use super::SceneError;
use crate::format::{DatasetFormat, SplitPolicyKind};
use glam::{DMat3, DMat4, DVec3};
use mvreel_data::Camera;
use mvreel_data::geometry::{rot_x, scale_matrix};
use std::sync::Arc;

/// How the isotropic scene scale is obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    /// Map the furthest camera to `target_max_distance` from the origin.
    FitCameras { target_max_distance: f64 },
    /// Use a configured multiplier regardless of the rig.
    Fixed { scale_mult: f64 },
}

/// How cameras are assigned to splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Every `test_camera_freq`-th camera in captured order is a test camera.
    PeriodicHoldout {
        test_camera_freq: usize,
        overlap: SplitOverlap,
    },
    /// Cameras carry their split label; the test split is strided by `test_skip`.
    Manifest { test_skip: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationPolicy {
    pub scale: ScaleMode,
    pub split: SplitPolicy,
    pub rotate_x_deg: f64,
    pub translation: DVec3,
}

impl NormalizationPolicy {
    /// Pick the policy variant for `format` under a resolved configuration.
    pub fn select(format: DatasetFormat, config: &SceneConfig) -> Result<Self, SceneError> {
        let scale = match config.scene_scale_mult {
            Some(scale_mult) => ScaleMode::Fixed { scale_mult },
            None => {
                let target = config.scene_type.target_max_camera_distance().ok_or(
                    super::ConfigError::UnsupportedSceneType(config.scene_type),
                )?;
                ScaleMode::FitCameras {
                    target_max_distance: target,
                }
            }
        };
        let split = match format.split_policy() {
            SplitPolicyKind::PeriodicHoldout => SplitPolicy::PeriodicHoldout {
                test_camera_freq: config.test_camera_freq,
                overlap: config.train_test_overlap,
            },
            SplitPolicyKind::Manifest => SplitPolicy::Manifest {
                test_skip: config.test_skip,
            },
        };
        Ok(Self {
            scale,
            split,
            rotate_x_deg: config.rotate_scene_x_axis_deg,
            translation: config.translation(),
        })
    }

    /// Camera distance statistics and the resulting scale multiplier.
    pub fn derive_stats<'a>(
        &self,
        poses: impl IntoIterator<Item = &'a DMat4>,
    ) -> Result<SceneStats, SceneError> {
        let (min, max) = SceneStats::camera_distances(poses).ok_or(SceneError::NoCameras)?;
        let scale_mult = match self.scale {
            ScaleMode::FitCameras {
                target_max_distance,
            } => target_max_distance / (max + SCALE_EPS),
            ScaleMode::Fixed { scale_mult } => scale_mult,
        };
        Ok(SceneStats::new(min, max, scale_mult))
    }

    /// `T(translation) * [scale * R_x(deg) 0; 0 1]`.
    pub fn compose_transform(&self, stats: &SceneStats) -> DMat4 {
        let rotation: DMat3 = scale_matrix(stats.scale_mult) * rot_x(self.rotate_x_deg.to_radians());
        DMat4::from_translation(self.translation) * DMat4::from_mat3(rotation)
    }

    /// Partition cameras into the `requested` splits. Cameras arrive in
    /// captured order, each with the label its source assigned, if any.
    pub fn assign_splits(
        &self,
        cameras: Vec<(Arc<Camera>, Option<Split>)>,
        requested: &[Split],
    ) -> Result<Splits, SceneError> {
        let mut splits = Splits::new();
        for &split in requested {
            splits.insert(split, Vec::new());
        }

        match self.split {
            SplitPolicy::PeriodicHoldout {
                test_camera_freq,
                overlap,
            } => {
                for (i, (camera, _)) in cameras.into_iter().enumerate() {
                    let is_test = i % test_camera_freq == 0;
                    if is_test {
                        if let Some(test) = splits.get_mut(&Split::Test) {
                            test.push(Arc::clone(&camera));
                        }
                    }
                    if !is_test || overlap == SplitOverlap::Overlapping {
                        if let Some(train) = splits.get_mut(&Split::Train) {
                            train.push(camera);
                        }
                    }
                }
            }
            SplitPolicy::Manifest { test_skip } => {
                let mut test_seen = 0usize;
                for (camera, label) in cameras {
                    let label = label.ok_or(SceneError::MissingSplitLabel {
                        camera_idx: camera.camera_idx(),
                    })?;
                    if label == Split::Test {
                        let keep = test_seen % test_skip == 0;
                        test_seen += 1;
                        if !keep {
                            continue;
                        }
                    }
                    if let Some(split) = splits.get_mut(&label) {
                        split.push(camera);
                    }
                }
            }
        }
        Ok(splits)
    }
}
