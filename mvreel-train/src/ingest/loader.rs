//! Interface implemented by on-disk dataset parsers.

use super::raw::RawScene;
use crate::scene::{SceneConfig, SceneError};
use std::path::{Path, PathBuf};

/// Errors raised while loading a scene. All of them abort the load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Missing required metadata file: {}", path.display())]
    MissingMetadata { path: PathBuf },
    #[error("Scene path does not exist: {}", path.display())]
    MissingScene { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image decoding error: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("Invalid metadata in {}: {reason}", path.display())]
    InvalidMetadata { path: PathBuf, reason: String },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// A parser for one dataset format.
///
/// Implementations return every camera of the scene, each with the split
/// label its source declares, and leave poses untouched. Split selection and
/// normalization happen afterwards, over the full camera set.
pub trait SceneLoader {
    fn load(&self, scene_path: &Path, config: &SceneConfig) -> Result<RawScene, LoadError>;
}

/// Path of a metadata file the scene cannot be loaded without.
pub fn require_metadata(scene_path: &Path, relative: impl AsRef<Path>) -> Result<PathBuf, LoadError> {
    let path = scene_path.join(relative);
    if path.is_file() {
        Ok(path)
    } else {
        Err(LoadError::MissingMetadata { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metadata_names_the_path() {
        let dir = std::env::temp_dir().join("mvreel-missing-metadata");
        let err = require_metadata(&dir, "transforms_train.json").unwrap_err();
        match err {
            LoadError::MissingMetadata { path } => {
                assert!(path.ends_with("transforms_train.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_existing_metadata_resolves() {
        let dir = std::env::temp_dir().join(format!("mvreel-metadata-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("poses_bounds.npy"), b"").unwrap();
        let path = require_metadata(&dir, "poses_bounds.npy").unwrap();
        assert_eq!(path, dir.join("poses_bounds.npy"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
