//! Camera entity: intrinsics, pose, transform pair and frame payloads.

use crate::backend::PointArray;
use crate::error::DataError;
use crate::frames::{FrameStack, Modality};
use crate::geometry::{apply_transform, opencv_to_opengl_intrinsics, project, unproject, world_to_camera};
use glam::{DMat3, DMat4, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pinhole intrinsics parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Intrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Square pixels, principal point at the image center, focal length from
    /// the horizontal field of view (radians).
    pub fn from_horizontal_fov(width: u32, height: u32, fov_x: f64) -> Self {
        let focal = 0.5 * width as f64 / (0.5 * fov_x).tan();
        Self::new(focal, focal, width as f64 / 2.0, height as f64 / 2.0)
    }

    pub fn from_matrix(matrix: &DMat3) -> Self {
        Self::new(
            matrix.x_axis.x,
            matrix.y_axis.y,
            matrix.z_axis.x,
            matrix.z_axis.y,
        )
    }

    /// Intrinsics for images downsampled by `factor`.
    pub fn subsampled(&self, factor: u32) -> Self {
        let f = factor as f64;
        Self::new(self.fx / f, self.fy / f, self.cx / f, self.cy / f)
    }

    pub fn to_matrix(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(self.fx, 0.0, 0.0),
            DVec3::new(0.0, self.fy, 0.0),
            DVec3::new(self.cx, self.cy, 1.0),
        )
    }
}

/// A calibrated camera with zero or more frame payloads.
///
/// The effective camera-to-world pose is `global_transform * pose * local_transform`.
/// Cameras are built once by a loader and only read afterwards.
#[derive(Debug, Clone)]
pub struct Camera {
    camera_idx: usize,
    intrinsics: DMat3,
    intrinsics_inv: DMat3,
    pose: DMat4,
    global_transform: DMat4,
    local_transform: DMat4,
    width: u32,
    height: u32,
    payloads: BTreeMap<Modality, FrameStack>,
    timestamps: Option<Vec<f64>>,
}

impl Camera {
    /// Create a camera with identity global and local transforms and no payloads.
    pub fn new(
        camera_idx: usize,
        intrinsics: Intrinsics,
        pose: DMat4,
        width: u32,
        height: u32,
    ) -> Self {
        let intrinsics = intrinsics.to_matrix();
        Self {
            camera_idx,
            intrinsics,
            intrinsics_inv: intrinsics.inverse(),
            pose,
            global_transform: DMat4::IDENTITY,
            local_transform: DMat4::IDENTITY,
            width,
            height,
            payloads: BTreeMap::new(),
            timestamps: None,
        }
    }

    pub fn with_transforms(mut self, global_transform: DMat4, local_transform: DMat4) -> Self {
        self.global_transform = global_transform;
        self.local_transform = local_transform;
        self
    }

    /// Attach a payload. Its resolution must match the camera and its frame
    /// count must agree with payloads and timestamps already attached.
    pub fn with_frames(mut self, modality: Modality, frames: FrameStack) -> Result<Self, DataError> {
        if frames.width() != self.width as usize || frames.height() != self.height as usize {
            return Err(DataError::ShapeMismatch {
                expected: format!("{}x{} {modality} frames", self.width, self.height),
                actual: format!("{}x{}", frames.width(), frames.height()),
            });
        }
        if let Some(expected) = self.declared_frames() {
            if frames.frames() != expected {
                return Err(DataError::FrameCountMismatch {
                    camera_idx: self.camera_idx,
                    modality: modality.to_string(),
                    expected,
                    actual: frames.frames(),
                });
            }
        }
        self.payloads.insert(modality, frames);
        Ok(self)
    }

    /// Attach one timestamp per frame.
    pub fn with_timestamps(mut self, timestamps: Vec<f64>) -> Result<Self, DataError> {
        if let Some(expected) = self.payloads.values().next().map(FrameStack::frames) {
            if timestamps.len() != expected {
                return Err(DataError::TimestampCountMismatch {
                    camera_idx: self.camera_idx,
                    expected,
                    actual: timestamps.len(),
                });
            }
        }
        self.timestamps = Some(timestamps);
        Ok(self)
    }

    fn declared_frames(&self) -> Option<usize> {
        self.payloads
            .values()
            .next()
            .map(FrameStack::frames)
            .or_else(|| self.timestamps.as_ref().map(Vec::len))
    }

    pub fn camera_idx(&self) -> usize {
        self.camera_idx
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn intrinsics(&self) -> &DMat3 {
        &self.intrinsics
    }

    pub fn intrinsics_inv(&self) -> &DMat3 {
        &self.intrinsics_inv
    }

    /// Pose as supplied by the loader, before the transform pair.
    pub fn raw_pose(&self) -> &DMat4 {
        &self.pose
    }

    pub fn global_transform(&self) -> &DMat4 {
        &self.global_transform
    }

    pub fn local_transform(&self) -> &DMat4 {
        &self.local_transform
    }

    /// Effective camera-to-world pose.
    pub fn pose(&self) -> DMat4 {
        self.global_transform * self.pose * self.local_transform
    }

    /// Camera center in world space.
    pub fn center(&self) -> DVec3 {
        self.pose().w_axis.truncate()
    }

    /// Rotation block of the effective pose. Carries the global scale, if any.
    pub fn rotation(&self) -> DMat3 {
        DMat3::from_mat4(self.pose())
    }

    /// Number of frames; a camera without payloads or timestamps has one.
    pub fn nr_frames(&self) -> usize {
        self.declared_frames().unwrap_or(1)
    }

    pub fn timestamps(&self) -> Option<&[f64]> {
        self.timestamps.as_deref()
    }

    pub fn timestamp(&self, frame: usize) -> Option<f64> {
        self.timestamps.as_ref().and_then(|t| t.get(frame).copied())
    }

    pub fn has_modality(&self, modality: Modality) -> bool {
        self.payloads.contains_key(&modality)
    }

    pub fn frames(&self, modality: Modality) -> Option<&FrameStack> {
        self.payloads.get(&modality)
    }

    pub fn modalities(&self) -> impl Iterator<Item = Modality> + '_ {
        self.payloads.keys().copied()
    }

    /// World-space rays through `pixels` (`N x 2`, continuous pixel
    /// coordinates). Returns `(origins, unit directions)`, both `N x 3`.
    pub fn rays_for_pixels<T: PointArray>(&self, pixels: &T) -> (T, T) {
        let dirs_camera: T = unproject(&self.intrinsics_inv, pixels);
        let rotation = self.rotation();
        let dirs: Vec<DVec3> = dirs_camera
            .to_vec3s()
            .into_iter()
            .map(|d| (rotation * d).normalize())
            .collect();
        let center = self.center();
        let origins = T::from_fn(dirs.len(), 3, |_, c| center[c]);
        (origins, T::from_vec3s(&dirs))
    }

    /// Project world points `N x 3` to pixel coordinates `N x 2`.
    pub fn project_points<T: PointArray>(&self, world_points: &T) -> T {
        let points_camera: T = apply_transform(world_points, &world_to_camera(&self.pose()));
        project(&self.intrinsics, &points_camera)
    }

    /// Euclidean distance from the camera to each world point, measured in
    /// camera space.
    pub fn points_distance<T: PointArray>(&self, world_points: &T) -> Vec<f64> {
        let points_camera: T = apply_transform(world_points, &world_to_camera(&self.pose()));
        points_camera.to_vec3s().iter().map(|p| p.length()).collect()
    }

    /// OpenGL projection matrix for this camera's intrinsics.
    pub fn opengl_projection(&self, near: f64, far: f64) -> DMat4 {
        opencv_to_opengl_intrinsics(&self.intrinsics, self.width, self.height, near, far)
    }
}
