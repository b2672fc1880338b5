//! Scene normalization.
//!
//! Raw camera poses are mapped into one canonical frame by a global similarity
//! transform, scene-scale statistics are derived from the rig, and cameras are
//! partitioned into splits. Which variant of each step runs is decided once
//! per dataset format, see [`NormalizationPolicy`].

pub mod config;
pub mod normalizer;
pub mod policy;
pub mod split;
pub mod stats;

pub use config::{ConfigError, ConfigMap, SceneConfig, SceneType, SplitOverlap};
pub use normalizer::{NormalizedScene, SceneNormalizer};
pub use policy::{NormalizationPolicy, ScaleMode, SplitPolicy};
pub use split::{Split, Splits};
pub use stats::SceneStats;

use mvreel_data::DataError;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Scene has no cameras")]
    NoCameras,
    #[error("Camera {camera_idx} has no split label")]
    MissingSplitLabel { camera_idx: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
}
