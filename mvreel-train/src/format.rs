//! Registry of supported dataset formats.
//!
//! Each format picks, once, how its scenes are normalized: the split policy,
//! the camera axis convention and the configuration defaults.

use crate::scene::ConfigError;
use crate::scene::config::ConfigMap;
use glam::DMat4;
use mvreel_data::geometry::rot_x;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DatasetFormat {
    Dtu,
    BlendedMvs,
    Blender,
    BlenderNerf,
    Dmsr,
    RefNerf,
    Llff,
    MipNerf360,
    Shelly,
    DNerf,
    Visor,
    Iphone,
    PanopticSports,
    Nerfies,
}

/// How a format assigns cameras to splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicyKind {
    /// Every Nth captured camera is held out for testing.
    PeriodicHoldout,
    /// The source data labels each camera with its split.
    Manifest,
}

/// Camera axis convention of the source poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraConvention {
    /// x right, y down, looking along +z.
    OpenCv,
    /// x right, y up, looking along -z.
    OpenGl,
}

impl CameraConvention {
    /// Local transform that maps this convention onto OpenCV axes.
    pub fn local_transform(&self) -> DMat4 {
        match self {
            CameraConvention::OpenCv => DMat4::IDENTITY,
            CameraConvention::OpenGl => DMat4::from_mat3(rot_x(PI)),
        }
    }
}

impl DatasetFormat {
    pub const ALL: [DatasetFormat; 14] = [
        DatasetFormat::Dtu,
        DatasetFormat::BlendedMvs,
        DatasetFormat::Blender,
        DatasetFormat::BlenderNerf,
        DatasetFormat::Dmsr,
        DatasetFormat::RefNerf,
        DatasetFormat::Llff,
        DatasetFormat::MipNerf360,
        DatasetFormat::Shelly,
        DatasetFormat::DNerf,
        DatasetFormat::Visor,
        DatasetFormat::Iphone,
        DatasetFormat::PanopticSports,
        DatasetFormat::Nerfies,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetFormat::Dtu => "dtu",
            DatasetFormat::BlendedMvs => "blended-mvs",
            DatasetFormat::Blender => "blender",
            DatasetFormat::BlenderNerf => "blendernerf",
            DatasetFormat::Dmsr => "dmsr",
            DatasetFormat::RefNerf => "refnerf",
            DatasetFormat::Llff => "llff",
            DatasetFormat::MipNerf360 => "mipnerf360",
            DatasetFormat::Shelly => "shelly",
            DatasetFormat::DNerf => "d-nerf",
            DatasetFormat::Visor => "visor",
            DatasetFormat::Iphone => "iphone",
            DatasetFormat::PanopticSports => "panoptic-sports",
            DatasetFormat::Nerfies => "nerfies",
        }
    }

    pub fn split_policy(&self) -> SplitPolicyKind {
        match self {
            DatasetFormat::Dtu
            | DatasetFormat::BlendedMvs
            | DatasetFormat::Llff
            | DatasetFormat::MipNerf360 => SplitPolicyKind::PeriodicHoldout,
            _ => SplitPolicyKind::Manifest,
        }
    }

    pub fn convention(&self) -> CameraConvention {
        match self {
            DatasetFormat::Blender
            | DatasetFormat::BlenderNerf
            | DatasetFormat::Dmsr
            | DatasetFormat::RefNerf
            | DatasetFormat::Shelly
            | DatasetFormat::DNerf => CameraConvention::OpenGl,
            _ => CameraConvention::OpenCv,
        }
    }

    /// Time-varying scenes with per-frame timestamps.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            DatasetFormat::DNerf
                | DatasetFormat::Visor
                | DatasetFormat::Iphone
                | DatasetFormat::PanopticSports
                | DatasetFormat::Nerfies
        )
    }

    /// Object-centric captures whose cameras lie on a hemisphere around the
    /// object.
    pub fn cameras_on_hemisphere(&self) -> bool {
        matches!(
            self,
            DatasetFormat::Dtu
                | DatasetFormat::BlendedMvs
                | DatasetFormat::Blender
                | DatasetFormat::BlenderNerf
                | DatasetFormat::RefNerf
                | DatasetFormat::Shelly
                | DatasetFormat::DNerf
        )
    }

    /// Defaults for every key this format reads. Keys absent from the caller's
    /// configuration are filled from here with a warning.
    pub fn config_defaults(&self) -> ConfigMap {
        let mut defaults = ConfigMap::new();
        defaults.insert("scene_type".into(), json!("bounded"));
        defaults.insert("rotate_scene_x_axis_deg".into(), json!(0.0));
        defaults.insert("translate_scene_x".into(), json!(0.0));
        defaults.insert("translate_scene_y".into(), json!(0.0));
        defaults.insert("translate_scene_z".into(), json!(0.0));
        defaults.insert("subsample_factor".into(), json!(1));
        defaults.insert("init_sphere_scale".into(), json!(0.1));

        match self.split_policy() {
            SplitPolicyKind::PeriodicHoldout => {
                defaults.insert("test_camera_freq".into(), json!(8));
                defaults.insert("train_test_overlap".into(), json!("exclusive"));
            }
            SplitPolicyKind::Manifest => {
                defaults.insert("test_skip".into(), json!(1));
            }
        }

        match self {
            DatasetFormat::Dmsr => {
                defaults.insert("rotate_scene_x_axis_deg".into(), json!(-90.0));
                defaults.insert("scene_scale_mult".into(), json!(1.0));
            }
            DatasetFormat::MipNerf360 => {
                defaults.insert("scene_type".into(), json!("unbounded"));
            }
            _ => {}
        }
        defaults
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        DatasetFormat::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| ConfigError::UnknownFormat(s.to_string()))
    }
}

impl TryFrom<String> for DatasetFormat {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DatasetFormat> for String {
    fn from(format: DatasetFormat) -> Self {
        format.name().to_string()
    }
}
