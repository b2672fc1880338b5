//! Ray batch sampling ("tensor reel").
//!
//! A [`TensorReel`] packs a fixed camera pool once; batches are then drawn from
//! it with an explicitly passed random source. The reel is never mutated after
//! construction, so any number of [`ReelSampler`]s can share it across threads.

pub mod batch;
pub mod request;
pub mod tensor_reel;

pub use batch::{ModalityValues, RayBatch};
pub use request::BatchRequest;
pub use tensor_reel::{ReelSampler, TensorReel};

use mvreel_data::Modality;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReelError {
    #[error("Camera pool is empty")]
    EmptyCameraPool,
    #[error("Camera {camera_idx} has an empty image plane")]
    EmptyImage { camera_idx: usize },
    #[error("Modality '{0}' is not available on any camera")]
    UnavailableModality(Modality),
    #[error("Modality '{0}' was not requested when the reel was built")]
    ModalityNotPacked(Modality),
    #[error("Modality '{modality}' has {actual} channels on camera {camera_idx}, expected {expected}")]
    ChannelMismatch {
        modality: Modality,
        camera_idx: usize,
        expected: usize,
        actual: usize,
    },
    #[error("batch_size must be positive")]
    EmptyBatch,
    #[error("rays_per_pixel must be positive")]
    ZeroRaysPerPixel,
    #[error("batch_size {batch_size} is not a multiple of rays_per_pixel {rays_per_pixel}")]
    IndivisibleBatch {
        batch_size: usize,
        rays_per_pixel: usize,
    },
    #[error("rays_per_pixel > 1 requires jitter_pixels")]
    JitterRequired,
    #[error("Candidate {0} set is empty")]
    EmptyCandidates(&'static str),
    #[error("Camera index {index} is out of range for a pool of {pool}")]
    CameraOutOfRange { index: usize, pool: usize },
    #[error("Frame index {frame} is out of range for camera {camera} with {nr_frames} frames")]
    FrameOutOfRange {
        frame: usize,
        camera: usize,
        nr_frames: usize,
    },
}
