//! Scene configuration resolution.
//!
//! Callers pass a loose string-keyed map; it is merged over the dataset
//! format's defaults and deserialized into a typed [`SceneConfig`]. Absent keys
//! are defaulted with a warning, out-of-range values are fatal.

use crate::format::DatasetFormat;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Caller-supplied configuration: format-specific keys, primitive or nested values.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Sub-sampling factors for which downsampled image folders exist.
pub const VALID_SUBSAMPLE_FACTORS: [u32; 4] = [1, 2, 4, 8];

/// Fatal configuration errors. Never substituted silently, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown dataset format '{0}'")]
    UnknownFormat(String),

    #[error("scene_type '{value}' must be one of bounded, unbounded, forward_facing")]
    InvalidSceneType { value: String },

    #[error("scene_type '{0}' is not supported yet")]
    UnsupportedSceneType(SceneType),

    #[error("subsample_factor {value} must be one of {valid:?}", valid = VALID_SUBSAMPLE_FACTORS)]
    UnsupportedSubsampleFactor { value: Value },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// How far scene content extends relative to the camera rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneType {
    /// All content fits in the foreground volume.
    Bounded,
    /// Content extends beyond the foreground sphere.
    Unbounded,
    /// Content lies in front of a forward-facing rig.
    ForwardFacing,
}

impl SceneType {
    pub fn name(&self) -> &'static str {
        match self {
            SceneType::Bounded => "bounded",
            SceneType::Unbounded => "unbounded",
            SceneType::ForwardFacing => "forward_facing",
        }
    }

    /// Distance the furthest camera is mapped to, or `None` when the scene
    /// type has no normalization yet.
    pub fn target_max_camera_distance(&self) -> Option<f64> {
        match self {
            SceneType::Bounded => Some(1.0),
            SceneType::Unbounded => Some(0.5),
            SceneType::ForwardFacing => None,
        }
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bounded" => Ok(SceneType::Bounded),
            "unbounded" => Ok(SceneType::Unbounded),
            "forward_facing" => Ok(SceneType::ForwardFacing),
            other => Err(ConfigError::InvalidSceneType {
                value: other.to_string(),
            }),
        }
    }
}

/// Whether the periodic-holdout `train` split also contains the test cameras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "OverlapRepr")]
pub enum SplitOverlap {
    /// Every camera lands in exactly one of train/test.
    #[default]
    Exclusive,
    /// Train receives every camera; test is still the held-out subset.
    Overlapping,
}

/// Accepted spellings: a boolean flag or the variant name.
#[derive(Deserialize)]
#[serde(untagged)]
enum OverlapRepr {
    Flag(bool),
    Name(String),
}

impl TryFrom<OverlapRepr> for SplitOverlap {
    type Error = String;

    fn try_from(repr: OverlapRepr) -> Result<Self, Self::Error> {
        match repr {
            OverlapRepr::Flag(false) => Ok(SplitOverlap::Exclusive),
            OverlapRepr::Flag(true) => Ok(SplitOverlap::Overlapping),
            OverlapRepr::Name(name) => match name.as_str() {
                "exclusive" => Ok(SplitOverlap::Exclusive),
                "overlapping" => Ok(SplitOverlap::Overlapping),
                other => Err(format!(
                    "train_test_overlap '{other}' must be a bool, 'exclusive' or 'overlapping'"
                )),
            },
        }
    }
}

/// Resolved, validated scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub scene_type: SceneType,
    pub rotate_scene_x_axis_deg: f64,
    pub translate_scene_x: f64,
    pub translate_scene_y: f64,
    pub translate_scene_z: f64,
    /// Fixed scale multiplier. When set, camera distances no longer drive the
    /// scene scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_scale_mult: Option<f64>,
    /// Every `test_camera_freq`-th camera is held out (periodic holdout formats).
    pub test_camera_freq: usize,
    pub train_test_overlap: SplitOverlap,
    /// Stride applied to the `test` split only (manifest formats).
    pub test_skip: usize,
    pub subsample_factor: u32,
    pub init_sphere_scale: f64,
    /// Keys this crate does not interpret, kept for the loader.
    #[serde(flatten)]
    pub extra: ConfigMap,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scene_type: SceneType::Bounded,
            rotate_scene_x_axis_deg: 0.0,
            translate_scene_x: 0.0,
            translate_scene_y: 0.0,
            translate_scene_z: 0.0,
            scene_scale_mult: None,
            test_camera_freq: 8,
            train_test_overlap: SplitOverlap::Exclusive,
            test_skip: 1,
            subsample_factor: 1,
            init_sphere_scale: 0.1,
            extra: ConfigMap::new(),
        }
    }
}

impl SceneConfig {
    /// Merge `user` over the defaults of `format` and validate the result.
    #[tracing::instrument(skip_all, fields(format = %format))]
    pub fn resolve(format: DatasetFormat, user: &ConfigMap) -> Result<Self, ConfigError> {
        let mut merged = user.clone();
        for (key, default) in format.config_defaults() {
            if !merged.contains_key(&key) {
                warn!("{key} not in config, setting to {default}");
                merged.insert(key, default);
            }
        }

        // parsed ahead of serde so a bad name reports the offending value
        if let Some(value) = merged.get("scene_type") {
            let name = value.as_str().ok_or_else(|| ConfigError::InvalidSceneType {
                value: value.to_string(),
            })?;
            name.parse::<SceneType>()?;
        }
        if let Some(value) = merged.get("subsample_factor") {
            let valid = value
                .as_u64()
                .is_some_and(|f| VALID_SUBSAMPLE_FACTORS.iter().any(|&v| v as u64 == f));
            if !valid {
                return Err(ConfigError::UnsupportedSubsampleFactor {
                    value: value.clone(),
                });
            }
        }

        let config: SceneConfig = serde_json::from_value(Value::Object(merged))?;
        config.validate()?;
        debug!(?config, "resolved scene config");
        Ok(config)
    }

    /// Fatal checks on a typed configuration. Run by [`SceneConfig::resolve`]
    /// and again by the normalizer, so hand-built configurations are held to
    /// the same rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scene_type.target_max_camera_distance().is_none() {
            return Err(ConfigError::UnsupportedSceneType(self.scene_type));
        }
        if !VALID_SUBSAMPLE_FACTORS.contains(&self.subsample_factor) {
            return Err(ConfigError::UnsupportedSubsampleFactor {
                value: Value::from(self.subsample_factor),
            });
        }
        if self.test_camera_freq == 0 {
            return Err(ConfigError::InvalidValue {
                key: "test_camera_freq",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.test_skip == 0 {
            return Err(ConfigError::InvalidValue {
                key: "test_skip",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(mult) = self.scene_scale_mult {
            if !(mult.is_finite() && mult > 0.0) {
                return Err(ConfigError::InvalidValue {
                    key: "scene_scale_mult",
                    reason: format!("{mult} is not a positive finite number"),
                });
            }
        }
        Ok(())
    }

    /// Per-axis offsets applied after rotation and scaling.
    pub fn translation(&self) -> DVec3 {
        DVec3::new(
            self.translate_scene_x,
            self.translate_scene_y,
            self.translate_scene_z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn map(value: Value) -> ConfigMap {
        match value {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = SceneConfig::resolve(DatasetFormat::Llff, &ConfigMap::new()).unwrap();
        assert_eq!(config.scene_type, SceneType::Bounded);
        assert_eq!(config.test_camera_freq, 8);
        assert_eq!(config.train_test_overlap, SplitOverlap::Exclusive);
        assert_eq!(config.subsample_factor, 1);
        assert_eq!(config.scene_scale_mult, None);
    }

    #[test]
    fn test_every_default_key_is_resolved() {
        for format in DatasetFormat::ALL {
            let config = SceneConfig::resolve(format, &ConfigMap::new()).unwrap();
            let resolved = match serde_json::to_value(&config).unwrap() {
                Value::Object(m) => m,
                _ => unreachable!(),
            };
            for (key, default) in format.config_defaults() {
                let value = &resolved[key.as_str()];
                match (value.as_f64(), default.as_f64()) {
                    (Some(a), Some(b)) => assert_eq!(a, b, "{format}: {key}"),
                    _ => assert_eq!(value, &default, "{format}: {key}"),
                }
            }
            assert!(config.extra.is_empty());
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_defaulted_keys_are_warned() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let mut user = ConfigMap::new();
        user.insert("test_camera_freq".into(), json!(4));
        tracing::subscriber::with_default(subscriber, || {
            SceneConfig::resolve(DatasetFormat::Llff, &user).unwrap();
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("subsample_factor not in config, setting to 1"));
        assert!(output.contains("scene_type not in config, setting to \"bounded\""));
        assert!(!output.contains("test_camera_freq not in config"));
    }

    #[test]
    fn test_format_defaults_differ() {
        let dmsr = SceneConfig::resolve(DatasetFormat::Dmsr, &ConfigMap::new()).unwrap();
        assert_eq!(dmsr.rotate_scene_x_axis_deg, -90.0);
        assert_eq!(dmsr.scene_scale_mult, Some(1.0));

        let mip = SceneConfig::resolve(DatasetFormat::MipNerf360, &ConfigMap::new()).unwrap();
        assert_eq!(mip.scene_type, SceneType::Unbounded);
    }

    #[test]
    fn test_user_values_win() {
        let user = map(json!({
            "scene_type": "unbounded",
            "rotate_scene_x_axis_deg": -120,
            "translate_scene_z": 0.2,
            "train_test_overlap": true,
            "subsample_factor": 8,
            "images_folder": "images_8",
        }));
        let config = SceneConfig::resolve(DatasetFormat::MipNerf360, &user).unwrap();
        assert_eq!(config.rotate_scene_x_axis_deg, -120.0);
        assert_eq!(config.translation(), DVec3::new(0.0, 0.0, 0.2));
        assert_eq!(config.train_test_overlap, SplitOverlap::Overlapping);
        assert_eq!(config.subsample_factor, 8);
        assert_eq!(config.extra.get("images_folder"), Some(&json!("images_8")));
    }

    #[test]
    fn test_overlap_accepts_names() {
        let user = map(json!({ "train_test_overlap": "overlapping" }));
        let config = SceneConfig::resolve(DatasetFormat::Dtu, &user).unwrap();
        assert_eq!(config.train_test_overlap, SplitOverlap::Overlapping);

        let user = map(json!({ "train_test_overlap": "sometimes" }));
        assert!(matches!(
            SceneConfig::resolve(DatasetFormat::Dtu, &user),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn test_fatal_scene_types() {
        let user = map(json!({ "scene_type": "forward-facing" }));
        assert!(matches!(
            SceneConfig::resolve(DatasetFormat::Llff, &user),
            Err(ConfigError::InvalidSceneType { .. })
        ));

        let user = map(json!({ "scene_type": "forward_facing" }));
        assert!(matches!(
            SceneConfig::resolve(DatasetFormat::Llff, &user),
            Err(ConfigError::UnsupportedSceneType(SceneType::ForwardFacing))
        ));
    }

    #[test]
    fn test_fatal_subsample_factor() {
        let user = map(json!({ "subsample_factor": 3 }));
        assert!(matches!(
            SceneConfig::resolve(DatasetFormat::Llff, &user),
            Err(ConfigError::UnsupportedSubsampleFactor { .. })
        ));
    }

    #[test]
    fn test_validate_hand_built_configs() {
        assert!(SceneConfig::default().validate().is_ok());

        let config = SceneConfig {
            subsample_factor: 3,
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedSubsampleFactor { .. })
        ));

        let config = SceneConfig {
            scene_type: SceneType::ForwardFacing,
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedSceneType(SceneType::ForwardFacing))
        ));

        let config = SceneConfig {
            test_skip: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "test_skip", .. })
        ));
    }

    #[test]
    fn test_zero_strides_rejected() {
        for key in ["test_camera_freq", "test_skip"] {
            let mut user = ConfigMap::new();
            user.insert(key.to_string(), json!(0));
            assert!(matches!(
                SceneConfig::resolve(DatasetFormat::Llff, &user),
                Err(ConfigError::InvalidValue { .. })
            ));
        }
    }
}
