//! Per-tick attraction between gravity sources and the bodies inside their volumes.
//!
//! Each pair follows Newton's law with an anisotropic twist: the displacement
//! is scaled component-wise by the source's directional bias before the
//! distance is taken.
//!
//! **F = G · M · m / |bias ⊙ d|²**, directed along `-normalize(bias ⊙ d)`.
//!
//! Pairs closer than the configured epsilon are skipped for the tick.

use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::GravityConfig;
use crate::core::{rigidbody::PhysicsBody, types::ForceMode};
use crate::gravity::{source::GravitySource, tracking::InfluenceTracker};
use crate::utils::allocator::{Arena, BodyId, SourceId};

/// Displacement from source to body with the directional bias applied.
pub fn biased_displacement(source_position: Vec3, body_position: Vec3, bias: Vec3) -> Vec3 {
    (body_position - source_position) * bias
}

/// Acceleration a source of `source_mass` imparts on a body at `body_position`.
///
/// Returns `None` when the biased separation is below `min_distance_squared`.
pub fn gravitational_acceleration(
    gravitational_constant: f32,
    source_mass: f32,
    source_position: Vec3,
    body_position: Vec3,
    bias: Vec3,
    min_distance_squared: f32,
) -> Option<Vec3> {
    let d = biased_displacement(source_position, body_position, bias);
    let r2 = d.length_squared();
    if r2.is_nan() || r2 < min_distance_squared {
        return None;
    }
    let magnitude = gravitational_constant * source_mass / r2;
    Some(-magnitude * (d / r2.sqrt()))
}

/// Force a source exerts on a body; equal and opposite to the reciprocal force.
pub fn gravitational_force(
    gravitational_constant: f32,
    source_mass: f32,
    body_mass: f32,
    source_position: Vec3,
    body_position: Vec3,
    bias: Vec3,
    min_distance_squared: f32,
) -> Option<Vec3> {
    gravitational_acceleration(
        gravitational_constant,
        source_mass,
        source_position,
        body_position,
        bias,
        min_distance_squared,
    )
    .map(|acceleration| acceleration * body_mass)
}

/// Inputs of one (source, body) evaluation, captured before any force is written.
#[derive(Debug, Clone, Copy)]
pub struct PairJob {
    pub source: SourceId,
    pub body: BodyId,
    pub source_position: Vec3,
    pub source_mass: f32,
    pub bias: Vec3,
    pub body_position: Vec3,
    pub body_mass: f32,
    pub reciprocal: Option<BodyId>,
}

impl PairJob {
    fn evaluate(&self, gravitational_constant: f32, min_distance_squared: f32) -> Option<PairForce> {
        let acceleration = gravitational_acceleration(
            gravitational_constant,
            self.source_mass,
            self.source_position,
            self.body_position,
            self.bias,
            min_distance_squared,
        )?;
        let force = acceleration * self.body_mass;
        if !(acceleration.is_finite() && force.is_finite()) {
            return None;
        }
        Some(PairForce {
            source: self.source,
            body: self.body,
            force,
            acceleration,
            reciprocal: self.reciprocal,
        })
    }
}

/// Force to apply on `body`; `reciprocal` receives `-force` under mutual gravitation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairForce {
    pub source: SourceId,
    pub body: BodyId,
    pub force: Vec3,
    /// `force` divided by the body's mass.
    pub acceleration: Vec3,
    pub reciprocal: Option<BodyId>,
}

/// Vector to hand to [`PhysicsBody::apply_force`] so one tick of `dt` under `mode`
/// changes velocity by `acceleration * dt`.
pub fn mode_vector(force: Vec3, acceleration: Vec3, mode: ForceMode, dt: f32) -> Vec3 {
    match mode {
        ForceMode::Force => force,
        ForceMode::Acceleration => acceleration,
        ForceMode::Impulse => force * dt,
        ForceMode::VelocityChange => acceleration * dt,
    }
}

/// Counters describing one attraction pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttractionStats {
    pub sources_active: usize,
    pub pairs_visited: usize,
    pub pairs_applied: usize,
    pub skipped_gravity_disabled: usize,
    pub skipped_singular: usize,
    pub reciprocal_applied: usize,
}

impl AttractionStats {
    pub fn merge(&mut self, other: &Self) {
        self.sources_active += other.sources_active;
        self.pairs_visited += other.pairs_visited;
        self.pairs_applied += other.pairs_applied;
        self.skipped_gravity_disabled += other.skipped_gravity_disabled;
        self.skipped_singular += other.skipped_singular;
        self.reciprocal_applied += other.reciprocal_applied;
    }
}

/// Runs the attraction pass: gather pairs, evaluate forces, apply them.
#[derive(Debug, Clone, Default)]
pub struct AttractionEngine {
    parallel: bool,
}

impl AttractionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled;
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Builds the jobs for every enabled source and each body in a snapshot of its tracked set.
    pub fn gather(
        &self,
        sources: &mut Arena<SourceId, GravitySource>,
        bodies: &Arena<BodyId, PhysicsBody>,
        tracker: &InfluenceTracker,
        stats: &mut AttractionStats,
    ) -> Vec<PairJob> {
        let mut jobs = Vec::with_capacity(tracker.pair_count());
        let source_ids: Vec<SourceId> = sources.ids().collect();

        for source_id in source_ids {
            let Some(source) = sources.get_mut(source_id) else {
                continue;
            };
            if !source.is_enabled() {
                continue;
            }
            let tracked = tracker.snapshot_bodies(source_id);
            if tracked.is_empty() {
                continue;
            }
            stats.sources_active += 1;

            let source_position = source.world_transform(bodies).position;
            let source_mass = source.resolve_mass(bodies);
            let bias = source.directional_bias();
            let reciprocal = source.reciprocal_body(bodies);

            for body_id in tracked {
                let Some(body) = bodies.get(body_id) else {
                    continue;
                };
                stats.pairs_visited += 1;
                if !body.gravity_enabled {
                    stats.skipped_gravity_disabled += 1;
                    continue;
                }
                jobs.push(PairJob {
                    source: source_id,
                    body: body_id,
                    source_position,
                    source_mass,
                    bias,
                    body_position: body.transform.position,
                    body_mass: body.mass(),
                    reciprocal,
                });
            }
        }

        jobs
    }

    /// Evaluates every job. Singular pairs are dropped and counted.
    pub fn evaluate(
        &self,
        jobs: &[PairJob],
        config: &GravityConfig,
        stats: &mut AttractionStats,
    ) -> Vec<PairForce> {
        let g = config.gravitational_constant;
        let eps = config.min_distance_squared;

        #[cfg(feature = "parallel")]
        let evaluated: Vec<Option<PairForce>> = if self.parallel {
            jobs.par_iter().map(|job| job.evaluate(g, eps)).collect()
        } else {
            jobs.iter().map(|job| job.evaluate(g, eps)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let evaluated: Vec<Option<PairForce>> =
            jobs.iter().map(|job| job.evaluate(g, eps)).collect();

        stats.skipped_singular += evaluated.iter().filter(|pair| pair.is_none()).count();
        evaluated.into_iter().flatten().collect()
    }

    /// Writes forces to the bodies in job order.
    pub fn apply(
        &self,
        forces: &[PairForce],
        bodies: &mut Arena<BodyId, PhysicsBody>,
        config: &GravityConfig,
        stats: &mut AttractionStats,
    ) {
        let mode = config.force_mode;
        let dt = config.time_step;
        for pair in forces {
            if let Some(body) = bodies.get_mut(pair.body) {
                body.apply_force(mode_vector(pair.force, pair.acceleration, mode, dt), mode);
                stats.pairs_applied += 1;
            }
            if let Some(reciprocal) = pair.reciprocal.and_then(|id| bodies.get_mut(id)) {
                let force = -pair.force;
                let acceleration = force * reciprocal.inverse_mass();
                reciprocal.apply_force(mode_vector(force, acceleration, mode, dt), mode);
                stats.reciprocal_applied += 1;
            }
        }
    }

    /// Full pass for one fixed tick.
    pub fn step(
        &self,
        sources: &mut Arena<SourceId, GravitySource>,
        bodies: &mut Arena<BodyId, PhysicsBody>,
        tracker: &InfluenceTracker,
        config: &GravityConfig,
    ) -> AttractionStats {
        let mut stats = AttractionStats::default();
        let jobs = self.gather(sources, bodies, tracker, &mut stats);
        let forces = self.evaluate(&jobs, config, &mut stats);
        self.apply(&forces, bodies, config, &mut stats);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GRAVITATIONAL_CONSTANT as G;
    use approx::assert_relative_eq;

    #[test]
    fn magnitude_falls_off_with_distance() {
        let mut previous = f32::INFINITY;
        for distance in [1.0_f32, 2.0, 5.0, 10.0, 50.0, 200.0] {
            let force = gravitational_force(
                G,
                1.0e9,
                2.0,
                Vec3::ZERO,
                Vec3::new(distance, 0.0, 0.0),
                Vec3::ONE,
                1e-6,
            )
            .unwrap();
            let magnitude = force.length();
            assert!(magnitude < previous, "F({distance}) = {magnitude} >= {previous}");
            previous = magnitude;
        }
    }

    #[test]
    fn force_points_toward_source() {
        let force = gravitational_force(
            G,
            1.0e9,
            1.0,
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(3.0, 10.0, 0.0),
            Vec3::ONE,
            1e-6,
        )
        .unwrap();
        assert!(force.y < 0.0);
        assert_relative_eq!(force.x, 0.0);
    }

    #[test]
    fn surface_acceleration_matches_surface_gravity() {
        let mass = 980.0 * 10.0 * 10.0 / G;
        let acceleration = gravitational_acceleration(
            G,
            mass,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ONE,
            1e-6,
        )
        .unwrap();
        assert_relative_eq!(acceleration.length(), 980.0, max_relative = 1e-4);
    }

    #[test]
    fn coincident_positions_are_skipped() {
        assert!(gravitational_force(G, 1.0e9, 1.0, Vec3::ONE, Vec3::ONE, Vec3::ONE, 1e-6).is_none());
        // A zero bias component can also collapse the separation.
        assert!(gravitational_force(
            G,
            1.0e9,
            1.0,
            Vec3::ZERO,
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            1e-6
        )
        .is_none());
    }

    #[test]
    fn bias_flattens_the_field() {
        let bias = Vec3::new(0.0, 1.0, 0.0);
        let force = gravitational_force(
            G,
            1.0e9,
            1.0,
            Vec3::ZERO,
            Vec3::new(7.0, 10.0, -3.0),
            bias,
            1e-6,
        )
        .unwrap();
        assert_relative_eq!(force.x, 0.0);
        assert_relative_eq!(force.z, 0.0);
        assert!(force.y < 0.0);
    }

    #[test]
    fn every_force_mode_yields_the_same_velocity_change() {
        let acceleration = Vec3::new(0.0, -980.0, 0.0);
        let mass = 2.0;
        let dt = 1.0 / 60.0;
        for mode in [
            ForceMode::Force,
            ForceMode::Acceleration,
            ForceMode::Impulse,
            ForceMode::VelocityChange,
        ] {
            let mut body = PhysicsBody::new(Vec3::ZERO, mass);
            body.apply_force(mode_vector(acceleration * mass, acceleration, mode, dt), mode);
            let delta_v = body.velocity.linear + body.acceleration * dt;
            assert!(
                delta_v.abs_diff_eq(acceleration * dt, 1e-4),
                "{mode:?}: {delta_v:?}"
            );
        }
    }

    #[test]
    fn stats_merge_accumulates() {
        let mut total = AttractionStats {
            pairs_applied: 2,
            ..AttractionStats::default()
        };
        total.merge(&AttractionStats {
            pairs_applied: 3,
            skipped_singular: 1,
            ..AttractionStats::default()
        });
        assert_eq!(total.pairs_applied, 5);
        assert_eq!(total.skipped_singular, 1);
    }
}
