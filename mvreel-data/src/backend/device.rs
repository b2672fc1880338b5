use super::PointArray;

/// Device-precision backend: row-major `f32` storage ready to be copied into
/// a GPU buffer without repacking.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceTensor {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl DeviceTensor {
    /// Wrap an existing row-major buffer. Returns `None` if the length does
    /// not match `rows * cols`.
    pub fn from_raw(rows: usize, cols: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw bytes for a device upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }
}

impl PointArray for DeviceTensor {
    fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c) as f32);
            }
        }
        Self { rows, cols, data }
    }

    fn nrows(&self) -> usize {
        self.rows
    }

    fn ncols(&self) -> usize {
        self.cols
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col] as f64
    }
}
