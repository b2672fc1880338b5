//! Pinhole projection and OpenCV/OpenGL convention conversion.

use super::homogeneous::{from_homogeneous, to_augmented};
use crate::backend::PointArray;
use glam::{DMat3, DMat4, DVec3, DVec4};

/// Project camera-space points `N x 3` to pixels `N x 2` through `[K | 0]`.
///
/// The divide is by camera-space depth. Points at zero depth come back as
/// `inf`/`NaN`, points behind the camera come back mirrored; callers check the
/// depth sign before trusting the output.
pub fn project<T: PointArray>(intrinsics: &DMat3, points_camera: &T) -> T {
    let augmented = to_augmented(points_camera);
    // [K | 0] drops the augmented coordinate, so only the first three columns matter.
    let homogeneous: Vec<DVec3> = (0..augmented.nrows())
        .map(|r| {
            *intrinsics * DVec3::new(augmented.at(r, 0), augmented.at(r, 1), augmented.at(r, 2))
        })
        .collect();
    let homogeneous = T::from_fn(homogeneous.len(), 3, |r, c| homogeneous[r][c]);
    from_homogeneous(&homogeneous)
}

/// Back-project pixels `N x 2` to unnormalized camera-space directions `N x 3`
/// (`z = 1` for a standard pinhole `K`).
pub fn unproject<T: PointArray>(intrinsics_inv: &DMat3, pixels: &T) -> T {
    let augmented = to_augmented(pixels);
    let directions: Vec<DVec3> = (0..augmented.nrows())
        .map(|r| {
            *intrinsics_inv
                * DVec3::new(augmented.at(r, 0), augmented.at(r, 1), augmented.at(r, 2))
        })
        .collect();
    T::from_vec3s(&directions)
}

/// OpenGL projection matrix for an OpenCV intrinsics matrix.
pub fn opencv_to_opengl_intrinsics(
    intrinsics: &DMat3,
    width: u32,
    height: u32,
    near: f64,
    far: f64,
) -> DMat4 {
    let (w, h) = (width as f64, height as f64);
    let fx = intrinsics.x_axis.x;
    let fy = intrinsics.y_axis.y;
    let cx = intrinsics.z_axis.x;
    let cy = intrinsics.z_axis.y;

    // row-major layout; the principal point terms sit in row 2
    let rows = [
        [2.0 * fx / w, 0.0, 0.0, 0.0],
        [0.0, 2.0 * fy / h, 0.0, 0.0],
        [
            2.0 * (cx / w) - 1.0,
            2.0 * (cy / h) - 1.0,
            -(far + near) / (far - near),
            -2.0 * far * near / (far - near),
        ],
        [0.0, 0.0, -1.0, 0.0],
    ];
    DMat4::from_cols_array_2d(&rows).transpose()
}

/// Flip the camera z axis: OpenCV camera-to-world to OpenGL camera-to-world.
pub fn opencv_to_opengl_pose(c2w: &DMat4) -> DMat4 {
    *c2w * DMat4::from_diagonal(DVec4::new(1.0, 1.0, -1.0, 1.0))
}
