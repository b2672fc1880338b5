//! Error types for geometry and payload validation.

use thiserror::Error;

/// Errors raised while building cameras, payloads, or geometric primitives.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Zero-length vector passed to {0}")]
    ZeroVector(&'static str),

    #[error("Invalid frame payload: {0}")]
    InvalidFrames(String),

    #[error("Camera {camera_idx}: {modality} has {actual} frames, expected {expected}")]
    FrameCountMismatch {
        camera_idx: usize,
        modality: String,
        expected: usize,
        actual: usize,
    },

    #[error("Camera {camera_idx}: {actual} timestamps for {expected} frames")]
    TimestampCountMismatch {
        camera_idx: usize,
        expected: usize,
        actual: usize,
    },
}
