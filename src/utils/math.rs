//! Quaternion and vector helpers layered on top of `glam`.

use glam::{Quat, Vec3};

/// Normalizes `v`, returning `None` when its length is too small to carry a direction.
pub fn try_direction(v: Vec3) -> Option<Vec3> {
    let length_sq = v.length_squared();
    if length_sq < 1e-12 || !length_sq.is_finite() {
        return None;
    }
    Some(v / length_sq.sqrt())
}

/// Shortest-arc rotation taking direction `from` onto direction `to`.
///
/// Both inputs must be unit length. Antiparallel inputs rotate half a turn
/// about an arbitrary perpendicular axis.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    Quat::from_rotation_arc(from, to)
}

/// Unsigned angle in radians between two non-zero vectors.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    match (try_direction(a), try_direction(b)) {
        (Some(a), Some(b)) => a.dot(b).clamp(-1.0, 1.0).acos(),
        _ => 0.0,
    }
}

/// Per-tick blend fraction of an exponential approach with time constant `tau`.
pub fn exponential_blend(dt: f32, tau: f32) -> f32 {
    1.0 - (-dt / tau).exp()
}
