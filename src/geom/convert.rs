//! Device to engine coordinate conversion.
//!
//! The capture device records in a right-handed, Y-up frame with meters and
//! radians. The engine is left-handed, Z-up, with centimeters and degrees.
//! Two rotation encodings exist in the file and each has its own remap:
//! camera poses store Euler angles, joints and anchors store 4x4 matrices.
//! The two paths are not interchangeable.
//!
//! Matrices follow the engine's row notation: `m[r][c]` is component `c` of
//! the `r`-th plane read from the file, which is column `r` of the glam
//! [`Mat4`] built by [`crate::stream::ByteCursor::read_matrix`].

use std::f32::consts::PI;

use crate::util::{Mat4, Quat, Transform, Vec3, UNIT_SCALE};

/// Tolerance for the degenerate-matrix test.
const KINDA_SMALL_NUMBER: f32 = 1.0e-4;

/// Device position `(x, y, z)` to engine `(-z, x, y) * 100`.
#[inline]
pub fn position_to_engine(p: Vec3) -> Vec3 {
    Vec3::new(-p.z, p.x, p.y) * UNIT_SCALE
}

#[inline]
fn rad_to_deg(rad: f32) -> f32 {
    rad * (180.0 / PI)
}

/// Engine pitch/yaw/roll (degrees) to quaternion.
///
/// Pitch turns about Y, yaw about Z, roll about X.
pub fn rotator_to_quat(pitch: f32, yaw: f32, roll: f32) -> Quat {
    const RADS_DIVIDED_BY_2: f32 = (PI / 180.0) / 2.0;

    let (sp, cp) = ((pitch % 360.0) * RADS_DIVIDED_BY_2).sin_cos();
    let (sy, cy) = ((yaw % 360.0) * RADS_DIVIDED_BY_2).sin_cos();
    let (sr, cr) = ((roll % 360.0) * RADS_DIVIDED_BY_2).sin_cos();

    Quat::from_xyzw(
        cr * sp * sy - sr * cp * cy,
        -cr * sp * cy - sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    )
}

/// Device roll-pitch-yaw radians to an engine rotation.
///
/// pitch = deg(rx), yaw = deg(-ry), roll = deg(-rz).
pub fn euler_to_engine(euler: Vec3) -> Quat {
    rotator_to_quat(rad_to_deg(euler.x), rad_to_deg(-euler.y), rad_to_deg(-euler.z))
}

/// Camera record (device position + Euler radians) to an engine transform.
pub fn camera_pose_to_engine(position: Vec3, euler: Vec3) -> Transform {
    Transform::new(position_to_engine(position), euler_to_engine(euler))
}

/// Rotation of the upper 3x3 block, engine matrix-to-quaternion algorithm.
///
/// Returns the raw quaternion in the matrix's own frame, before any axis remap.
pub fn matrix_rotation(mat: &Mat4) -> Quat {
    let m = mat.to_cols_array_2d();

    let axis_nearly_zero = |r: usize| {
        m[r][0].abs() <= KINDA_SMALL_NUMBER
            && m[r][1].abs() <= KINDA_SMALL_NUMBER
            && m[r][2].abs() <= KINDA_SMALL_NUMBER
    };
    if axis_nearly_zero(0) && axis_nearly_zero(1) && axis_nearly_zero(2) {
        return Quat::IDENTITY;
    }

    let tr = m[0][0] + m[1][1] + m[2][2];
    if tr > 0.0 {
        let inv_s = 1.0 / (tr + 1.0).sqrt();
        let w = 0.5 / inv_s;
        let s = 0.5 * inv_s;
        Quat::from_xyzw(
            (m[1][2] - m[2][1]) * s,
            (m[2][0] - m[0][2]) * s,
            (m[0][1] - m[1][0]) * s,
            w,
        )
    } else {
        // Largest diagonal element picks the stable branch
        let mut i = 0;
        if m[1][1] > m[0][0] {
            i = 1;
        }
        if m[2][2] > m[i][i] {
            i = 2;
        }
        const NXT: [usize; 3] = [1, 2, 0];
        let j = NXT[i];
        let k = NXT[j];

        let s = m[i][i] - m[j][j] - m[k][k] + 1.0;
        let inv_s = 1.0 / s.sqrt();

        let mut qt = [0.0f32; 4];
        qt[i] = 0.5 / inv_s;
        let s = 0.5 * inv_s;
        qt[3] = (m[j][k] - m[k][j]) * s;
        qt[j] = (m[i][j] + m[j][i]) * s;
        qt[k] = (m[i][k] + m[k][i]) * s;

        Quat::from_xyzw(qt[0], qt[1], qt[2], qt[3])
    }
}

/// Matrix record (joint, anchor, probe) to an engine transform.
///
/// rotation = `(-qz, qx, qy, -qw)` of the raw matrix quaternion,
/// translation = `(-m[3][2], m[3][0], m[3][1]) * 100`.
pub fn matrix_to_engine(mat: &Mat4) -> Transform {
    let raw = matrix_rotation(mat);
    let rotation = Quat::from_xyzw(-raw.z, raw.x, raw.y, -raw.w);

    let t = mat.col(3);
    let translation = Vec3::new(-t.z, t.x, t.y) * UNIT_SCALE;

    Transform::new(translation, rotation)
}
