//! Train/test split report
//!
//! Normalizes a synthetic camera ring under a dataset format's policy and
//! reports the resulting splits and scene statistics.
//!
//! Usage:
//!   cargo run --example train_test_splits -- [format] [config_json]
//!
//! e.g. `cargo run --example train_test_splits -- llff '{"test_camera_freq": 4}'`

use glam::{DMat4, DVec3};
use mvreel_data::Intrinsics;
use mvreel_data::geometry::look_at;
use mvreel_train::ingest::LoadError;
use mvreel_train::{
    ConfigMap, DatasetFormat, MvDataset, RawCamera, RawScene, SceneConfig, SceneLoader, Split,
    SplitPolicyKind,
};
use std::error::Error;
use std::f64::consts::TAU;
use std::path::Path;
use tracing::info;

/// A ring of cameras around the origin, labelled for manifest formats.
struct RingLoader {
    nr_cameras: usize,
    radius: f64,
}

impl SceneLoader for RingLoader {
    fn load(&self, _: &Path, config: &SceneConfig) -> Result<RawScene, LoadError> {
        let intrinsics = Intrinsics::from_horizontal_fov(640, 480, 0.9);
        let mut cameras = Vec::with_capacity(self.nr_cameras);
        for i in 0..self.nr_cameras {
            let angle = i as f64 / self.nr_cameras as f64 * TAU;
            let eye = DVec3::new(angle.cos(), angle.sin(), 0.3) * self.radius;
            let rotation = look_at(eye, DVec3::ZERO, DVec3::Z).map_err(|e| LoadError::InvalidMetadata {
                path: "ring".into(),
                reason: e.to_string(),
            })?;
            let pose = DMat4::from_cols(
                rotation.x_axis.extend(0.0),
                rotation.y_axis.extend(0.0),
                rotation.z_axis.extend(0.0),
                eye.extend(1.0),
            );
            let label = if i % 5 == 0 { Split::Test } else { Split::Train };
            cameras.push(RawCamera::new(i, pose, intrinsics, 640, 480).with_split(label));
        }
        info!(cameras = cameras.len(), subsample_factor = config.subsample_factor, "built ring");
        Ok(RawScene {
            cameras,
            point_clouds: Vec::new(),
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let format: DatasetFormat = args.next().as_deref().unwrap_or("llff").parse()?;
    let config: ConfigMap = match args.next() {
        Some(json) => serde_json::from_str(&json)?,
        None => ConfigMap::new(),
    };

    let loader = RingLoader {
        nr_cameras: 40,
        radius: 3.0,
    };
    let dataset = MvDataset::load(
        &loader,
        format,
        &std::env::temp_dir(),
        &[Split::Train, Split::Test],
        &config,
    )?;

    let policy = match format.split_policy() {
        SplitPolicyKind::PeriodicHoldout => "periodic holdout",
        SplitPolicyKind::Manifest => "manifest",
    };
    info!("{format}: {policy} split, {:?} cameras", format.convention());
    for (split, cameras) in dataset.splits() {
        let ids: Vec<usize> = cameras.iter().map(|c| c.camera_idx()).collect();
        info!("{split}: {} cameras {:?}", ids.len(), ids);
    }
    let stats = dataset.stats();
    info!(
        min_camera_distance = stats.min_camera_distance,
        max_camera_distance = stats.max_camera_distance,
        scene_scale = stats.scene_scale,
        scale_mult = stats.scale_mult,
        scene_radius = dataset.scene_radius(),
        foreground_radius = dataset.foreground_radius(),
        "scene statistics"
    );

    Ok(())
}
