//! Small vector helpers shared by the player and the camera.
//!
//! World space is z-up: the ground plane is XY, yaw turns around +Z and
//! pitch lifts away from the ground plane. All angles are in degrees.

use glam::{Mat3, Quat, Vec3};

pub const UP: Vec3 = Vec3::Z;

/// Eye offset from its focus for an orbit of `distance` at `yaw`/`pitch`.
///
/// At yaw 0 the eye sits on -X looking toward +X; positive pitch raises it.
pub fn spherical_offset(yaw_deg: f32, pitch_deg: f32, distance: f32) -> Vec3 {
    let (sy, cy) = yaw_deg.to_radians().sin_cos();
    let (sp, cp) = pitch_deg.to_radians().sin_cos();

    Vec3::new(-distance * cy * cp, -distance * sy * cp, distance * sp)
}

/// Forward/right unit vectors on the ground plane for a heading.
pub fn heading_basis(yaw_deg: f32) -> (Vec3, Vec3) {
    let (s, c) = yaw_deg.to_radians().sin_cos();
    let forward = Vec3::new(c, s, 0.0);
    // forward x up
    let right = Vec3::new(s, -c, 0.0);
    (forward, right)
}

/// Rotation whose local +Y points along `forward` and local +Z stays up.
///
/// `forward` must not be parallel to [`UP`].
pub fn look_rotation(forward: Vec3) -> Quat {
    let f = forward.normalize_or_zero();
    let r = f.cross(UP).normalize_or_zero();
    let u = r.cross(f);
    Quat::from_mat3(&Mat3::from_cols(r, f, u))
}
