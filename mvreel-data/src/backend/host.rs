use super::PointArray;
use ndarray::Array2;

/// CPU array backend.
pub type HostArray = Array2<f64>;

impl PointArray for Array2<f64> {
    fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c))
    }

    fn nrows(&self) -> usize {
        self.shape()[0]
    }

    fn ncols(&self) -> usize {
        self.shape()[1]
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self[[row, col]]
    }
}
