//! Pose algebra for 4x4 camera-to-world transforms.

use glam::{DMat3, DMat4, DVec4};

const RIGID_TOLERANCE: f64 = 1e-6;

/// Whether `pose` is a rigid transform: orthonormal rotation block and a
/// `[0, 0, 0, 1]` bottom row.
pub fn is_rigid(pose: &DMat4) -> bool {
    let r = DMat3::from_mat4(*pose);
    let bottom_ok = pose.row(3).abs_diff_eq(DVec4::W, RIGID_TOLERANCE);
    bottom_ok && (r.transpose() * r).abs_diff_eq(DMat3::IDENTITY, RIGID_TOLERANCE)
}

/// Inverse of a pose. Rigid poses use `[R^T | -R^T t]`; anything else (for
/// example a similarity transform carrying scale) falls back to a general
/// inverse.
pub fn invert_pose(pose: &DMat4) -> DMat4 {
    if is_rigid(pose) {
        let r_t = DMat3::from_mat4(*pose).transpose();
        let t = pose.w_axis.truncate();
        let mut inv = DMat4::from_mat3(r_t);
        inv.w_axis = (-(r_t * t)).extend(1.0);
        inv
    } else {
        pose.inverse()
    }
}

/// World-to-camera transform for a camera-to-world `pose`.
pub fn world_to_camera(c2w: &DMat4) -> DMat4 {
    invert_pose(c2w)
}

/// Camera-to-world transform for a world-to-camera `extrinsics`.
pub fn camera_to_world(w2c: &DMat4) -> DMat4 {
    invert_pose(w2c)
}

/// Rotate the pose frame about its own axes: `pose * [R 0; 0 1]`.
pub fn pose_local_rotation(pose: &DMat4, rotation: &DMat3) -> DMat4 {
    *pose * DMat4::from_mat3(*rotation)
}

/// Rotate the pose frame about the world axes: `[R 0; 0 1] * pose`.
pub fn pose_global_rotation(pose: &DMat4, rotation: &DMat3) -> DMat4 {
    DMat4::from_mat3(*rotation) * *pose
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{rot_x, rot_z};
    use glam::DVec3;

    #[test]
    fn test_rigid_inverse_matches_general_inverse() {
        let mut pose = DMat4::from_mat3(rot_x(0.4) * rot_z(-1.1));
        pose.w_axis = DVec3::new(3.0, -1.0, 2.0).extend(1.0);
        assert!(is_rigid(&pose));
        let fast = world_to_camera(&pose);
        assert!(fast.abs_diff_eq(pose.inverse(), 1e-12));
        assert!((fast * pose).abs_diff_eq(DMat4::IDENTITY, 1e-12));
    }

    #[test]
    fn test_similarity_uses_general_inverse() {
        let pose = DMat4::from_scale(DVec3::splat(0.25)) * DMat4::from_mat3(rot_x(0.3));
        assert!(!is_rigid(&pose));
        assert!((invert_pose(&pose) * pose).abs_diff_eq(DMat4::IDENTITY, 1e-12));
    }

    #[test]
    fn test_local_vs_global_rotation() {
        let mut pose = DMat4::IDENTITY;
        pose.w_axis = DVec3::new(1.0, 0.0, 0.0).extend(1.0);
        let r = rot_z(std::f64::consts::FRAC_PI_2);

        let local = pose_local_rotation(&pose, &r);
        assert!(local.w_axis.truncate().abs_diff_eq(DVec3::X, 1e-12));

        let global = pose_global_rotation(&pose, &r);
        assert!(global.w_axis.truncate().abs_diff_eq(DVec3::Y, 1e-12));
    }
}
