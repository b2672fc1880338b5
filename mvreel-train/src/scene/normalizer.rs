//! Scene normalizer: raw cameras in, canonical cameras and splits out.

use super::config::{ConfigMap, SceneConfig};
use super::policy::NormalizationPolicy;
use super::split::{Split, Splits};
use super::stats::SceneStats;
use super::SceneError;
use crate::format::DatasetFormat;
use crate::ingest::RawCamera;
use glam::DMat4;
use mvreel_data::Camera;
use std::sync::Arc;
use tracing::{debug, info};

/// Output of a normalization run. Frozen: a different canonical frame needs a
/// new run.
#[derive(Debug, Clone)]
pub struct NormalizedScene {
    pub splits: Splits,
    pub global_transform: DMat4,
    pub stats: SceneStats,
}

#[derive(Debug, Clone)]
pub struct SceneNormalizer {
    format: DatasetFormat,
    config: SceneConfig,
    policy: NormalizationPolicy,
}

impl SceneNormalizer {
    /// Fails on any configuration [`SceneConfig::validate`] rejects.
    pub fn new(format: DatasetFormat, config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let policy = NormalizationPolicy::select(format, &config)?;
        debug!(?policy, %format, "selected normalization policy");
        Ok(Self {
            format,
            config,
            policy,
        })
    }

    /// Resolve a caller configuration against `format`'s defaults first.
    pub fn from_config_map(format: DatasetFormat, user: &ConfigMap) -> Result<Self, SceneError> {
        let config = SceneConfig::resolve(format, user)?;
        Self::new(format, config)
    }

    pub fn format(&self) -> DatasetFormat {
        self.format
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn policy(&self) -> &NormalizationPolicy {
        &self.policy
    }

    /// Normalize the scene's full camera set and keep the `splits` requested.
    ///
    /// `raw` must hold every camera of the scene, whatever its split: the
    /// global transform is derived from all of them, so it does not depend on
    /// which splits are requested.
    #[tracing::instrument(skip_all, fields(format = %self.format, cameras = raw.len()))]
    pub fn normalize(&self, raw: Vec<RawCamera>, splits: &[Split]) -> Result<NormalizedScene, SceneError> {
        let stats = self.policy.derive_stats(raw.iter().map(|c| &c.pose))?;
        let global_transform = self.policy.compose_transform(&stats);
        let local_transform = self.format.convention().local_transform();
        let factor = self.config.subsample_factor;

        let cameras = raw
            .into_iter()
            .map(|raw| {
                let mut camera = Camera::new(
                    raw.camera_idx,
                    raw.intrinsics.subsampled(factor),
                    raw.pose,
                    raw.width / factor,
                    raw.height / factor,
                )
                .with_transforms(global_transform, local_transform);
                for (modality, frames) in raw.payloads {
                    camera = camera.with_frames(modality, frames)?;
                }
                if let Some(timestamps) = raw.timestamps {
                    camera = camera.with_timestamps(timestamps)?;
                }
                Ok((Arc::new(camera), raw.split))
            })
            .collect::<Result<Vec<_>, SceneError>>()?;

        let splits = self.policy.assign_splits(cameras, splits)?;
        info!(
            min_camera_distance = stats.min_camera_distance,
            max_camera_distance = stats.max_camera_distance,
            scene_scale = stats.scene_scale,
            scale_mult = stats.scale_mult,
            "normalized scene"
        );
        for (split, cameras) in &splits {
            debug!(%split, cameras = cameras.len());
        }

        Ok(NormalizedScene {
            splits,
            global_transform,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ConfigError;
    use approx::assert_abs_diff_eq;
    use glam::DVec3;
    use mvreel_data::{FrameStack, Intrinsics, Modality};
    use serde_json::json;

    fn ring(n: usize, radius: f64) -> Vec<RawCamera> {
        (0..n)
            .map(|i| {
                let angle = i as f64 / n as f64 * std::f64::consts::TAU;
                let eye = DVec3::new(angle.cos(), angle.sin(), 0.0) * radius;
                RawCamera::new(
                    i,
                    DMat4::from_translation(eye),
                    Intrinsics::new(80.0, 80.0, 40.0, 30.0),
                    80,
                    60,
                )
            })
            .collect()
    }

    #[test]
    fn test_bounded_scene_fits_unit_sphere() {
        let normalizer = SceneNormalizer::from_config_map(DatasetFormat::Llff, &ConfigMap::new()).unwrap();
        let scene = normalizer
            .normalize(ring(16, 4.0), &[Split::Train, Split::Test])
            .unwrap();

        assert_abs_diff_eq!(scene.stats.max_camera_distance, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scene.stats.scene_scale, 4.0);
        assert_abs_diff_eq!(scene.stats.scale_mult, 1.0 / 4.01);
        for camera in scene.splits.values().flatten() {
            assert!(camera.center().length() < 1.0);
            assert_eq!(*camera.global_transform(), scene.global_transform);
        }
        assert_eq!(scene.splits[&Split::Test].len(), 2);
        assert_eq!(scene.splits[&Split::Train].len(), 14);
    }

    #[test]
    fn test_unbounded_scene_targets_half_radius() {
        let mut user = ConfigMap::new();
        user.insert("scene_type".into(), json!("unbounded"));
        let normalizer = SceneNormalizer::from_config_map(DatasetFormat::Dtu, &user).unwrap();
        let scene = normalizer.normalize(ring(4, 10.0), &[Split::Train]).unwrap();
        let furthest = scene.splits[&Split::Train]
            .iter()
            .map(|c| c.center().length())
            .fold(0.0, f64::max);
        assert!(furthest < 0.5 && furthest > 0.49);
    }

    #[test]
    fn test_subsampling_scales_intrinsics() {
        let mut user = ConfigMap::new();
        user.insert("subsample_factor".into(), json!(4));
        let normalizer = SceneNormalizer::from_config_map(DatasetFormat::Llff, &user).unwrap();
        let scene = normalizer.normalize(ring(2, 1.0), &[Split::Train]).unwrap();
        let camera = &scene.splits[&Split::Train][0];
        assert_eq!((camera.width(), camera.height()), (20, 15));
        assert_abs_diff_eq!(camera.intrinsics().x_axis.x, 20.0);
        assert_abs_diff_eq!(camera.intrinsics().z_axis.x, 10.0);
    }

    #[test]
    fn test_opengl_formats_get_local_flip() {
        let raw = ring(3, 2.0)
            .into_iter()
            .map(|c| c.with_split(Split::Train))
            .collect();
        let normalizer = SceneNormalizer::from_config_map(DatasetFormat::Dmsr, &ConfigMap::new()).unwrap();
        let scene = normalizer.normalize(raw, &[Split::Train]).unwrap();
        assert_abs_diff_eq!(scene.stats.scale_mult, 1.0);
        let camera = &scene.splits[&Split::Train][0];
        let flipped = camera.local_transform().transform_vector3(DVec3::Z);
        assert!(flipped.abs_diff_eq(-DVec3::Z, 1e-12));
    }

    #[test]
    fn test_payload_mismatch_is_reported() {
        let frames = FrameStack::new(1, 2, 2, 3, vec![0.0; 12]).unwrap();
        let raw = vec![ring(1, 1.0).remove(0).with_frames(Modality::Rgb, frames)];
        let normalizer = SceneNormalizer::from_config_map(DatasetFormat::Llff, &ConfigMap::new()).unwrap();
        assert!(matches!(
            normalizer.normalize(raw, &[Split::Train]),
            Err(SceneError::Data(_))
        ));
    }

    #[test]
    fn test_hand_built_config_is_validated() {
        let config = SceneConfig {
            subsample_factor: 3,
            ..SceneConfig::default()
        };
        assert!(matches!(
            SceneNormalizer::new(DatasetFormat::Llff, config),
            Err(SceneError::Config(ConfigError::UnsupportedSubsampleFactor { .. }))
        ));

        for (format, config) in [
            (
                DatasetFormat::Llff,
                SceneConfig {
                    test_camera_freq: 0,
                    ..SceneConfig::default()
                },
            ),
            (
                DatasetFormat::Blender,
                SceneConfig {
                    test_skip: 0,
                    ..SceneConfig::default()
                },
            ),
        ] {
            assert!(matches!(
                SceneNormalizer::new(format, config),
                Err(SceneError::Config(ConfigError::InvalidValue { .. }))
            ));
        }
    }

    #[test]
    fn test_transform_independent_of_requested_splits() {
        let raw: Vec<RawCamera> = (0..6)
            .map(|i| {
                let (split, radius) = if i < 3 { (Split::Train, 2.0) } else { (Split::Test, 6.0) };
                RawCamera::new(
                    i,
                    DMat4::from_translation(DVec3::new(radius, 0.0, 0.0)),
                    Intrinsics::new(8.0, 8.0, 4.0, 4.0),
                    8,
                    8,
                )
                .with_split(split)
            })
            .collect();
        let normalizer = SceneNormalizer::from_config_map(DatasetFormat::Blender, &ConfigMap::new()).unwrap();
        let train_only = normalizer.normalize(raw.clone(), &[Split::Train]).unwrap();
        let both = normalizer.normalize(raw, &[Split::Train, Split::Test]).unwrap();

        assert!(!train_only.splits.contains_key(&Split::Test));
        assert_eq!(train_only.global_transform, both.global_transform);
        assert_abs_diff_eq!(train_only.stats.max_camera_distance, 6.0);
        assert_eq!(
            train_only.splits[&Split::Train][0].center(),
            both.splits[&Split::Train][0].center()
        );
    }

    #[test]
    fn test_empty_rig_is_rejected() {
        let normalizer = SceneNormalizer::from_config_map(DatasetFormat::Llff, &ConfigMap::new()).unwrap();
        assert!(matches!(
            normalizer.normalize(Vec::new(), &[Split::Train]),
            Err(SceneError::NoCameras)
        ));
    }
}
