//! Sampled ray batches.

use mvreel_data::{DeviceTensor, Modality, PointArray};
use std::collections::BTreeMap;

/// Ground truth for one modality, aligned with the batch rows.
#[derive(Debug, Clone)]
pub struct ModalityValues<T: PointArray = DeviceTensor> {
    /// `batch_size x channels`; rows of rays whose camera lacks the modality are NaN.
    pub values: T,
    /// Whether the ray's camera carries the modality.
    pub present: Vec<bool>,
}

impl<T: PointArray> ModalityValues<T> {
    pub fn nr_present(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }
}

/// One batch of rays. All arrays have `batch_size` rows, in draw order.
#[derive(Debug, Clone)]
pub struct RayBatch<T: PointArray = DeviceTensor> {
    /// World-space ray origins, `N x 3`.
    pub rays_o: T,
    /// Unit world-space ray directions, `N x 3`.
    pub rays_d: T,
    /// Continuous pixel coordinates the rays pass through, `N x 2`.
    pub pixels: T,
    /// Pool positions of the sampled cameras.
    pub camera_indices: Vec<usize>,
    pub frame_indices: Vec<usize>,
    /// Frame timestamps; `0.0` for cameras without timestamps.
    pub timestamps: Vec<f64>,
    /// Requested modalities that at least one sampled ray has.
    pub vals: BTreeMap<Modality, ModalityValues<T>>,
}

impl<T: PointArray> RayBatch<T> {
    pub fn len(&self) -> usize {
        self.camera_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.camera_indices.is_empty()
    }

    pub fn get(&self, modality: Modality) -> Option<&ModalityValues<T>> {
        self.vals.get(&modality)
    }
}
