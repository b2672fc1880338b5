//! Rotation construction.

use crate::error::DataError;
use glam::{DMat3, DVec3};
use rand::Rng;
use std::f64::consts::PI;
use tracing::debug;

/// Dot-product margin below which two unit vectors count as anti-parallel.
pub const ANTIPARALLEL_EPS: f64 = 1e-8;

/// Magnitude of the random nudge applied to an anti-parallel source vector.
const PERTURBATION_SCALE: f64 = 0.01;

const MAX_PERTURBATIONS: usize = 16;

/// Right-handed rotation about the x axis.
pub fn rot_x(theta: f64) -> DMat3 {
    DMat3::from_rotation_x(theta)
}

/// Right-handed rotation about the y axis.
pub fn rot_y(theta: f64) -> DMat3 {
    DMat3::from_rotation_y(theta)
}

/// Right-handed rotation about the z axis.
pub fn rot_z(theta: f64) -> DMat3 {
    DMat3::from_rotation_z(theta)
}

/// Right-handed rotation of `angle` radians about an arbitrary `axis`.
pub fn rotation_about_axis(axis: DVec3, angle: f64) -> Result<DMat3, DataError> {
    let axis = axis
        .try_normalize()
        .ok_or(DataError::ZeroVector("rotation_about_axis"))?;
    Ok(DMat3::from_axis_angle(axis, angle))
}

/// Isotropic 3x3 scale matrix.
pub fn scale_matrix(scale: f64) -> DMat3 {
    DMat3::from_diagonal(DVec3::splat(scale))
}

/// Rotation taking direction `a` onto direction `b`.
///
/// When `a` and `b` are anti-parallel the rotation axis is undefined, so `a`
/// is nudged by a small random vector drawn from `rng` and the construction is
/// retried. The retry loop is bounded; if every nudge still lands
/// anti-parallel a half turn about an axis orthogonal to `a` is returned.
pub fn rotation_between<R: Rng + ?Sized>(
    a: DVec3,
    b: DVec3,
    rng: &mut R,
) -> Result<DMat3, DataError> {
    let b = b
        .try_normalize()
        .ok_or(DataError::ZeroVector("rotation_between"))?;
    let mut a = a
        .try_normalize()
        .ok_or(DataError::ZeroVector("rotation_between"))?;

    for attempt in 0..MAX_PERTURBATIONS {
        let c = a.dot(b);
        if c >= -1.0 + ANTIPARALLEL_EPS {
            return Ok(rodrigues(a, b, c));
        }
        debug!(attempt, "anti-parallel vectors, perturbing source direction");
        let eps = DVec3::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
        ) * PERTURBATION_SCALE;
        a = (a + eps).try_normalize().unwrap_or(a);
    }

    Ok(DMat3::from_axis_angle(a.any_orthonormal_vector(), PI))
}

/// `I + [v]x + [v]x^2 / (1 + c)` with `v = a x b`, `c = a . b`; both unit length.
fn rodrigues(a: DVec3, b: DVec3, c: f64) -> DMat3 {
    let v = a.cross(b);
    let skew = DMat3::from_cols(
        DVec3::new(0.0, v.z, -v.y),
        DVec3::new(-v.z, 0.0, v.x),
        DVec3::new(v.y, -v.x, 0.0),
    );
    DMat3::IDENTITY + skew + skew * skew * (1.0 / (1.0 + c))
}

/// Camera frame looking from `eye` towards `center`.
///
/// Columns are the camera axes in world space, with `z` pointing from the
/// center back to the eye (the camera looks along `-z`).
pub fn look_at(eye: DVec3, center: DVec3, up: DVec3) -> Result<DMat3, DataError> {
    let z = (eye - center)
        .try_normalize()
        .ok_or(DataError::ZeroVector("look_at (eye == center)"))?;
    let x = up
        .cross(z)
        .try_normalize()
        .ok_or(DataError::ZeroVector("look_at (up parallel to view)"))?;
    let y = z.cross(x).normalize();
    Ok(DMat3::from_cols(x, y, z))
}
