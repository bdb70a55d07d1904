//! Dominant-gravity resolution and self-righting.
//!
//! The dominant gravity of a body is the single strongest candidate among the
//! ambient field and the pull of each tracked source. Candidates are never
//! summed: a blended direction between two wells wobbles, the strongest one
//! does not.

use glam::{Quat, Vec3};

use super::object::RightingState;
use super::source::GravitySource;
use super::tracking::InfluenceTracker;
use crate::config::GravityConfig;
use crate::core::rigidbody::PhysicsBody;
use crate::dynamics::attraction::gravitational_acceleration;
use crate::utils::allocator::{Arena, BodyId, SourceId};
use crate::utils::math::{angle_between, rotation_between, try_direction};

/// Picks the candidate of strictly greatest magnitude, starting from `ambient`.
///
/// Ties keep the earlier candidate.
pub fn strongest_candidate(ambient: Vec3, candidates: impl IntoIterator<Item = Vec3>) -> Vec3 {
    candidates.into_iter().fold(ambient, |strongest, candidate| {
        if candidate.length_squared() > strongest.length_squared() {
            candidate
        } else {
            strongest
        }
    })
}

/// Acceleration each enabled source tracking `body_id` would impart on it, in source id order.
pub fn source_candidates(
    body_id: BodyId,
    bodies: &Arena<BodyId, PhysicsBody>,
    sources: &mut Arena<SourceId, GravitySource>,
    tracker: &InfluenceTracker,
    config: &GravityConfig,
) -> Vec<Vec3> {
    let Some(body) = bodies.get(body_id) else {
        return Vec::new();
    };
    let position = body.transform.position;

    tracker
        .sources_of(body_id)
        .into_iter()
        .filter_map(|source_id| {
            let source = sources.get_mut(source_id)?;
            if !source.is_enabled() {
                return None;
            }
            let source_position = source.world_transform(bodies).position;
            let mass = source.resolve_mass(bodies);
            gravitational_acceleration(
                config.gravitational_constant,
                mass,
                source_position,
                position,
                source.directional_bias(),
                config.min_distance_squared,
            )
        })
        .collect()
}

/// Dominant gravity vector acting on `body_id`, or `None` if the body does not exist.
pub fn compute_dominant_gravity(
    body_id: BodyId,
    bodies: &Arena<BodyId, PhysicsBody>,
    sources: &mut Arena<SourceId, GravitySource>,
    tracker: &InfluenceTracker,
    config: &GravityConfig,
) -> Option<Vec3> {
    if !bodies.contains(body_id) {
        return None;
    }
    let candidates = source_candidates(body_id, bodies, sources, tracker, config);
    Some(strongest_candidate(config.ambient_gravity, candidates))
}

/// Orientation whose up axis points away from `dominant`, reached by the shortest arc.
pub fn righting_target(current: Quat, dominant: Vec3) -> Option<Quat> {
    let target_up = try_direction(-dominant)?;
    let up = try_direction(current * Vec3::Y)?;
    Some((rotation_between(up, target_up) * current).normalize())
}

/// One tick of self-righting.
///
/// Returns the state observed before the correction and the blended orientation.
pub fn self_right(
    current: Quat,
    dominant: Vec3,
    blend: f32,
    alignment_tolerance: f32,
) -> (RightingState, Quat) {
    let Some(target) = righting_target(current, dominant) else {
        return (RightingState::Stable, current);
    };

    let error = angle_between(current * Vec3::Y, -dominant);
    let state = if error <= alignment_tolerance {
        RightingState::Aligned
    } else {
        RightingState::Correcting
    };

    let next = current.slerp(target, blend.clamp(0.0, 1.0)).normalize();
    (state, next)
}
