//! Quaternion <-> rotation matrix conversion. Quaternions are `[w, x, y, z]`.

use glam::{DMat3, DVec3};
use nalgebra::{Matrix4, SymmetricEigen};

/// Rotation matrix for a unit quaternion `[w, x, y, z]`.
pub fn qvec_to_rotmat(qvec: [f64; 4]) -> DMat3 {
    let [w, x, y, z] = qvec;
    DMat3::from_cols(
        DVec3::new(
            1.0 - 2.0 * y * y - 2.0 * z * z,
            2.0 * x * y + 2.0 * w * z,
            2.0 * z * x - 2.0 * w * y,
        ),
        DVec3::new(
            2.0 * x * y - 2.0 * w * z,
            1.0 - 2.0 * x * x - 2.0 * z * z,
            2.0 * y * z + 2.0 * w * x,
        ),
        DVec3::new(
            2.0 * z * x + 2.0 * w * y,
            2.0 * y * z - 2.0 * w * x,
            1.0 - 2.0 * x * x - 2.0 * y * y,
        ),
    )
}

/// Unit quaternion `[w, x, y, z]` for a rotation matrix.
///
/// Takes the eigenvector of the largest eigenvalue of the symmetric 4x4 key
/// matrix built from `rotation`, then flips its sign so `w >= 0`.
pub fn rotmat_to_qvec(rotation: &DMat3) -> [f64; 4] {
    let r = |row: usize, col: usize| rotation.col(col)[row];
    let (rxx, ryx, rzx) = (r(0, 0), r(0, 1), r(0, 2));
    let (rxy, ryy, rzy) = (r(1, 0), r(1, 1), r(1, 2));
    let (rxz, ryz, rzz) = (r(2, 0), r(2, 1), r(2, 2));

    let k10 = ryx + rxy;
    let k20 = rzx + rxz;
    let k21 = rzy + ryz;
    let k30 = ryz - rzy;
    let k31 = rzx - rxz;
    let k32 = rxy - ryx;
    #[rustfmt::skip]
    let key = Matrix4::new(
        rxx - ryy - rzz, k10,             k20,             k30,
        k10,             ryy - rxx - rzz, k21,             k31,
        k20,             k21,             rzz - rxx - ryy, k32,
        k30,             k31,             k32,             rxx + ryy + rzz,
    ) / 3.0;

    let eigen = SymmetricEigen::new(key);
    let best = eigen.eigenvalues.imax();
    let v = eigen.eigenvectors.column(best);

    let mut qvec = [v[3], v[0], v[1], v[2]];
    if qvec[0] < 0.0 {
        qvec.iter_mut().for_each(|q| *q = -*q);
    }
    qvec
}
