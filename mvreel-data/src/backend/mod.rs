//! Numeric backends for the geometry kernel.
//!
//! Every kernel operation is written once against [`PointArray`], a dense
//! row-major `N x C` array of points. Two conforming storages exist:
//!
//! - [`HostArray`]: an `ndarray` matrix of `f64`, the CPU array backend
//! - [`DeviceTensor`]: a packed `f32` buffer laid out for upload to a device
//!
//! Arithmetic is always carried out in `f64`; the backend only decides how the
//! result is stored. Results agree across backends within `1e-5`.

mod device;
mod host;

pub use device::DeviceTensor;
pub use host::HostArray;

use glam::{DVec2, DVec3};

/// A dense `rows x cols` array of scalars, one point per row.
pub trait PointArray: Clone + std::fmt::Debug + Send + Sync {
    /// Build an array by evaluating `f(row, col)` for every element.
    fn from_fn(rows: usize, cols: usize, f: impl FnMut(usize, usize) -> f64) -> Self;

    /// Number of points.
    fn nrows(&self) -> usize;

    /// Number of coordinates per point.
    fn ncols(&self) -> usize;

    /// Element at `(row, col)`, widened to `f64`.
    fn at(&self, row: usize, col: usize) -> f64;

    fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    /// Build an `N x 3` array from 3D points.
    fn from_vec3s(points: &[DVec3]) -> Self {
        Self::from_fn(points.len(), 3, |r, c| points[r][c])
    }

    /// Build an `N x 2` array from 2D points.
    fn from_vec2s(points: &[DVec2]) -> Self {
        Self::from_fn(points.len(), 2, |r, c| points[r][c])
    }

    /// Row `row` of an `N x 3` array.
    fn vec3(&self, row: usize) -> DVec3 {
        DVec3::new(self.at(row, 0), self.at(row, 1), self.at(row, 2))
    }

    /// Row `row` of an `N x 2` array.
    fn vec2(&self, row: usize) -> DVec2 {
        DVec2::new(self.at(row, 0), self.at(row, 1))
    }

    /// All rows of an `N x 3` array.
    fn to_vec3s(&self) -> Vec<DVec3> {
        (0..self.nrows()).map(|r| self.vec3(r)).collect()
    }

    /// Convert into another backend.
    fn convert<T: PointArray>(&self) -> T {
        T::from_fn(self.nrows(), self.ncols(), |r, c| self.at(r, c))
    }
}
