//! Synthetic cameras for exercising the sampler without captured data.

use glam::{DMat4, DVec3};
use mvreel_data::geometry::{look_at, rot_x};
use mvreel_data::{Camera, DataError, Intrinsics};
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Highest sampled elevation, as a fraction of the radius. Keeps eyes off the
/// pole, where the up vector is parallel to the viewing direction.
const MAX_ELEVATION: f64 = 0.99;

/// `nr_cameras` payload-free cameras spread uniformly over the upper (+z)
/// hemisphere of `radius`, each looking at the origin.
pub fn sample_cameras_on_hemisphere<R: Rng + ?Sized>(
    intrinsics: Intrinsics,
    width: u32,
    height: u32,
    radius: f64,
    nr_cameras: usize,
    rng: &mut R,
) -> Result<Vec<Camera>, DataError> {
    // look_at builds a camera looking down -z; flip into +z viewing axes
    let local_transform = DMat4::from_mat3(rot_x(PI));
    (0..nr_cameras)
        .map(|camera_idx| {
            let z: f64 = rng.gen_range(0.0..MAX_ELEVATION);
            let phi: f64 = rng.gen_range(0.0..TAU);
            let ring = (1.0 - z * z).sqrt();
            let eye = radius * DVec3::new(ring * phi.cos(), ring * phi.sin(), z);
            let rotation = look_at(eye, DVec3::ZERO, DVec3::Z)?;
            let pose = DMat4::from_cols(
                rotation.x_axis.extend(0.0),
                rotation.y_axis.extend(0.0),
                rotation.z_axis.extend(0.0),
                eye.extend(1.0),
            );
            Ok(Camera::new(camera_idx, intrinsics, pose, width, height)
                .with_transforms(DMat4::IDENTITY, local_transform))
        })
        .collect()
}
