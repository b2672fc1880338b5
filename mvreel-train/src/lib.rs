//! MvReel training crate
//!
//! Turns multi-view camera datasets into a normalized scene and serves
//! randomly sampled ray batches from it.
//!
//! ## Modules
//!
//! - [`format`]: Registry of supported dataset formats and their policies
//! - [`scene`]: Configuration, scene normalization and split assignment
//! - [`ingest`]: Loader interface, raw scene content and virtual cameras
//! - [`dataset`]: Loading and normalizing a scene in one call
//! - [`reel`]: Ray batch sampling over a fixed camera pool

pub mod dataset;
pub mod format;
pub mod ingest;
pub mod reel;
pub mod scene;

pub use dataset::MvDataset;
pub use format::{CameraConvention, DatasetFormat, SplitPolicyKind};
pub use ingest::{LoadError, RawCamera, RawScene, SceneLoader, sample_cameras_on_hemisphere};
pub use reel::{BatchRequest, RayBatch, ReelError, ReelSampler, TensorReel};
pub use scene::{ConfigError, ConfigMap, SceneConfig, SceneError, SceneNormalizer, SceneStats, Split};
