//! Boundary with the on-disk dataset parsers.
//!
//! Parsers implement [`SceneLoader`] and hand back [`RawScene`]s; nothing here
//! reads a specific file format.

pub mod loader;
pub mod raw;
pub mod virtual_cameras;

pub use loader::{LoadError, SceneLoader, require_metadata};
pub use raw::{RawCamera, RawScene};
pub use virtual_cameras::sample_cameras_on_hemisphere;
