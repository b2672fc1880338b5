//! Multi-view dataset orchestration: config resolution, loading, normalization.

use crate::format::DatasetFormat;
use crate::ingest::{LoadError, SceneLoader};
use crate::scene::{ConfigMap, SceneConfig, SceneError, SceneNormalizer, SceneStats, Split, Splits};
use glam::DMat4;
use mvreel_data::{Camera, PointCloud};
use std::ops::Index;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A loaded, normalized multi-view scene.
#[derive(Debug, Clone)]
pub struct MvDataset {
    format: DatasetFormat,
    config: SceneConfig,
    splits: Splits,
    global_transform: DMat4,
    stats: SceneStats,
    point_clouds: Vec<PointCloud>,
}

impl MvDataset {
    /// Load `splits` of the scene at `scene_path` with `loader`, then normalize.
    ///
    /// Point clouds returned by the loader are moved into the canonical frame
    /// with the same global transform as the cameras.
    #[tracing::instrument(skip_all, fields(format = %format, scene = %scene_path.display()))]
    pub fn load<L: SceneLoader + ?Sized>(
        loader: &L,
        format: DatasetFormat,
        scene_path: &Path,
        splits: &[Split],
        user_config: &ConfigMap,
    ) -> Result<Self, LoadError> {
        if !scene_path.exists() {
            return Err(LoadError::MissingScene {
                path: scene_path.to_path_buf(),
            });
        }
        let config = SceneConfig::resolve(format, user_config).map_err(SceneError::from)?;
        let normalizer = SceneNormalizer::new(format, config.clone())?;

        let raw = loader.load(scene_path, &config)?;
        let scene = normalizer.normalize(raw.cameras, splits)?;
        let point_clouds = raw
            .point_clouds
            .iter()
            .map(|pc| pc.transformed(&scene.global_transform))
            .collect();

        info!(
            splits = ?scene.splits.keys().collect::<Vec<_>>(),
            scene_scale = scene.stats.scene_scale,
            "loaded dataset"
        );
        Ok(Self {
            format,
            config,
            splits: scene.splits,
            global_transform: scene.global_transform,
            stats: scene.stats,
            point_clouds,
        })
    }

    pub fn format(&self) -> DatasetFormat {
        self.format
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn splits(&self) -> &Splits {
        &self.splits
    }

    pub fn split(&self, split: Split) -> Option<&[Arc<Camera>]> {
        self.splits.get(&split).map(Vec::as_slice)
    }

    pub fn global_transform(&self) -> &DMat4 {
        &self.global_transform
    }

    pub fn stats(&self) -> &SceneStats {
        &self.stats
    }

    pub fn point_clouds(&self) -> &[PointCloud] {
        &self.point_clouds
    }

    /// Largest frame count over all loaded cameras.
    pub fn nr_per_camera_frames(&self) -> usize {
        self.splits
            .values()
            .flatten()
            .map(|c| c.nr_frames())
            .max()
            .unwrap_or(0)
    }

    /// Radius of the normalized camera rig.
    pub fn scene_radius(&self) -> f64 {
        self.stats.max_camera_distance * self.stats.scale_mult
    }

    /// Radius of the sphere expected to enclose the foreground object,
    /// `init_sphere_scale` times the rig radius.
    pub fn foreground_radius(&self) -> f64 {
        self.config.init_sphere_scale * self.scene_radius()
    }

    pub fn cameras_on_hemisphere(&self) -> bool {
        self.format.cameras_on_hemisphere()
    }

    pub fn is_dynamic(&self) -> bool {
        self.format.is_dynamic()
    }
}

impl Index<Split> for MvDataset {
    type Output = [Arc<Camera>];

    /// Panics if `split` was not requested at load time.
    fn index(&self, split: Split) -> &Self::Output {
        &self.splits[&split]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{RawCamera, RawScene, require_metadata};
    use approx::assert_abs_diff_eq;
    use glam::DVec3;
    use mvreel_data::{FrameStack, Intrinsics, Modality};
    use std::path::PathBuf;

    /// Serves a fixed rig; labels every other camera `test`. Test cameras sit
    /// further out than train cameras.
    struct RigLoader {
        nr_cameras: usize,
        radius: f64,
    }

    impl SceneLoader for RigLoader {
        fn load(&self, _: &Path, config: &SceneConfig) -> Result<RawScene, LoadError> {
            let side = 8 / config.subsample_factor as usize;
            let cameras = (0..self.nr_cameras)
                .map(|i| {
                    let label = if i % 2 == 0 { Split::Train } else { Split::Test };
                    let radius = if label == Split::Test { 2.0 * self.radius } else { self.radius };
                    let pose = DMat4::from_translation(DVec3::new(radius, 0.0, i as f64 * 0.01));
                    let frames = FrameStack::new(2, side, side, 3, vec![0.5; 2 * side * side * 3])?;
                    Ok(RawCamera::new(i, pose, Intrinsics::new(8.0, 8.0, 4.0, 4.0), 8, 8)
                        .with_split(label)
                        .with_frames(Modality::Rgb, frames))
                })
                .collect::<Result<Vec<_>, mvreel_data::DataError>>()
                .map_err(SceneError::from)?;
            Ok(RawScene {
                cameras,
                point_clouds: vec![PointCloud::new(vec![DVec3::new(self.radius, 0.0, 0.0)])],
            })
        }
    }

    /// Fails the way a parser does when its metadata file is absent.
    struct MetadataLoader;

    impl SceneLoader for MetadataLoader {
        fn load(&self, scene_path: &Path, _: &SceneConfig) -> Result<RawScene, LoadError> {
            require_metadata(scene_path, "transforms.json")?;
            Ok(RawScene::default())
        }
    }

    fn scene_dir() -> PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn test_load_normalizes_cameras_and_point_clouds() {
        let loader = RigLoader {
            nr_cameras: 6,
            radius: 3.0,
        };
        let dataset = MvDataset::load(
            &loader,
            DatasetFormat::Blender,
            &scene_dir(),
            &[Split::Train, Split::Test],
            &ConfigMap::new(),
        )
        .unwrap();

        assert_eq!(dataset[Split::Train].len(), 3);
        assert_eq!(dataset[Split::Test].len(), 3);
        assert_eq!(dataset.nr_per_camera_frames(), 2);
        assert!(dataset.cameras_on_hemisphere());
        assert!(dataset.scene_radius() < 1.0);
        assert_abs_diff_eq!(dataset.foreground_radius(), 0.1 * dataset.scene_radius());

        let moved = dataset.point_clouds()[0].points[0];
        let expected = dataset.global_transform().transform_point3(DVec3::new(3.0, 0.0, 0.0));
        assert!(moved.abs_diff_eq(expected, 1e-12));
    }

    #[test]
    fn test_requested_splits_share_one_canonical_frame() {
        let loader = RigLoader {
            nr_cameras: 6,
            radius: 2.0,
        };
        let load = |splits: &[Split]| {
            MvDataset::load(&loader, DatasetFormat::Blender, &scene_dir(), splits, &ConfigMap::new()).unwrap()
        };
        let train_only = load(&[Split::Train]);
        let both = load(&[Split::Train, Split::Test]);

        assert!(train_only.split(Split::Test).is_none());
        assert_eq!(train_only.global_transform(), both.global_transform());
        assert_abs_diff_eq!(train_only.stats().max_camera_distance, 4.0, epsilon = 1e-3);
        for (a, b) in train_only[Split::Train].iter().zip(&both[Split::Train]) {
            assert_eq!(a.camera_idx(), b.camera_idx());
            assert_eq!(a.center(), b.center());
        }
    }

    #[test]
    fn test_missing_metadata_aborts_load() {
        let result = MvDataset::load(
            &MetadataLoader,
            DatasetFormat::Dmsr,
            &scene_dir().join(format!("mvreel-no-scene-{}", std::process::id())),
            &[Split::Train],
            &ConfigMap::new(),
        );
        assert!(matches!(result, Err(LoadError::MissingScene { .. })));

        let dir = scene_dir().join(format!("mvreel-empty-scene-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let result = MvDataset::load(&MetadataLoader, DatasetFormat::Dmsr, &dir, &[Split::Train], &ConfigMap::new());
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(result, Err(LoadError::MissingMetadata { .. })));
    }

    #[test]
    fn test_unknown_scene_type_aborts_load() {
        let mut user = ConfigMap::new();
        user.insert("scene_type".into(), serde_json::json!("indoor"));
        let loader = RigLoader {
            nr_cameras: 2,
            radius: 1.0,
        };
        let result = MvDataset::load(&loader, DatasetFormat::Llff, &scene_dir(), &[Split::Train], &user);
        assert!(matches!(
            result,
            Err(LoadError::Scene(SceneError::Config(_)))
        ));
    }
}
