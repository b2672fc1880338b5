//! Homogeneous coordinate helpers.

use crate::backend::PointArray;
use glam::{DAffine3, DMat4, DVec4};
use tracing::warn;

/// Homogeneous coordinates with `|w|` below this are treated as degenerate.
pub const DEGENERATE_W_EPS: f64 = 1e-12;

/// Append a unit homogeneous coordinate: `N x C -> N x (C + 1)`.
pub fn to_augmented<T: PointArray>(points: &T) -> T {
    let cols = points.ncols();
    T::from_fn(points.nrows(), cols + 1, |r, c| {
        if c == cols { 1.0 } else { points.at(r, c) }
    })
}

/// Divide by the last coordinate and drop it: `N x (C + 1) -> N x C`.
///
/// Rows whose last coordinate is (near) zero are not rejected; they come back
/// as `inf`/`NaN` and a `DivisionDegenerate` warning is logged with the
/// number of affected rows. Callers filter such rows themselves.
pub fn from_homogeneous<T: PointArray>(points: &T) -> T {
    let rows = points.nrows();
    let last = points.ncols().saturating_sub(1);

    let degenerate = (0..rows)
        .filter(|&r| points.at(r, last).abs() < DEGENERATE_W_EPS)
        .count();
    if degenerate > 0 {
        warn!(
            degenerate,
            total = rows,
            "DivisionDegenerate: homogeneous coordinate below {}",
            DEGENERATE_W_EPS
        );
    }

    T::from_fn(rows, last, |r, c| points.at(r, c) / points.at(r, last))
}

/// Apply a 4x4 homogeneous transform to `N x 3` points.
pub fn apply_transform<T: PointArray>(points: &T, transform: &DMat4) -> T {
    let augmented = to_augmented(points);
    let transformed: Vec<DVec4> = (0..augmented.nrows())
        .map(|r| {
            let p = DVec4::new(
                augmented.at(r, 0),
                augmented.at(r, 1),
                augmented.at(r, 2),
                augmented.at(r, 3),
            );
            *transform * p
        })
        .collect();
    let homogeneous = T::from_fn(transformed.len(), 4, |r, c| transformed[r][c]);
    from_homogeneous(&homogeneous)
}

/// Extend a 3x4 `[R | t]` matrix with the bottom row `[0, 0, 0, 1]`.
pub fn pad_matrix(matrix: &DAffine3) -> DMat4 {
    DMat4::from(*matrix)
}

/// Drop the bottom row of a 4x4 pose, keeping `[R | t]`.
pub fn unpad_matrix(matrix: &DMat4) -> DAffine3 {
    DAffine3::from_mat4(*matrix)
}
