//! MvReel Data Crate
//!
//! GPU-agnostic geometry and camera data for multi-view datasets: numeric
//! backends, the geometry kernel, the camera entity with its frame payloads,
//! and point clouds.
//!
//! ## Modules
//!
//! - [`backend`]: host (`ndarray`) and device (`f32` buffer) point arrays
//! - [`geometry`]: rotations, homogeneous transforms, projection, quaternions
//! - [`camera`]: intrinsics, poses and per-frame payloads
//! - [`frames`]: modalities and frame stacks
//! - [`point_cloud`]: point sets co-registered with the cameras

pub mod backend;
pub mod camera;
pub mod error;
pub mod frames;
pub mod geometry;
pub mod point_cloud;

pub use backend::{DeviceTensor, HostArray, PointArray};
pub use camera::{Camera, Intrinsics};
pub use error::DataError;
pub use frames::{FrameStack, Modality};
pub use point_cloud::PointCloud;
