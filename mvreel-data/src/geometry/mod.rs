//! Geometry kernel: rotations, homogeneous coordinates, pinhole projection,
//! pose algebra and quaternion conversion.
//!
//! Array-valued operations are generic over [`PointArray`](crate::backend::PointArray)
//! so host arrays and device tensors share one implementation. Small fixed-size
//! matrices (poses, intrinsics) are `glam` `f64` types.

mod homogeneous;
mod pose;
mod projection;
mod quaternion;
mod rotation;

pub use homogeneous::{
    DEGENERATE_W_EPS, apply_transform, from_homogeneous, pad_matrix, to_augmented, unpad_matrix,
};
pub use pose::{
    camera_to_world, invert_pose, is_rigid, pose_global_rotation, pose_local_rotation,
    world_to_camera,
};
pub use projection::{opencv_to_opengl_intrinsics, opencv_to_opengl_pose, project, unproject};
pub use quaternion::{qvec_to_rotmat, rotmat_to_qvec};
pub use rotation::{
    ANTIPARALLEL_EPS, look_at, rot_x, rot_y, rot_z, rotation_about_axis, rotation_between,
    scale_matrix,
};
