use std::collections::BTreeMap;

use glam::Vec3;
use log::debug;

use crate::{
    collision::overlap::OverlapMonitor,
    config::GravityConfig,
    core::{rigidbody::PhysicsBody, types::ForceMode},
    dynamics::{
        attraction::{AttractionEngine, AttractionStats},
        integrator::Integrator,
    },
    error::{GravityError, GravityResult},
    gravity::{
        coupling::MassAuthority,
        object::{GravityObject, RightingState},
        resolver,
        source::{GravitySource, GravitySourceDesc},
        tracking::{InfluenceTracker, OverlapEvent, OverlapOutcome, RejectReason},
        ComponentState,
    },
    utils::{
        allocator::{Arena, BodyId, SourceId},
        logging::{ScopedTimer, WarnOnce},
    },
};

/// Host loop owning bodies, gravity components and the fixed-step accumulator.
///
/// All attraction, membership changes and self-righting happen inside
/// [`GravityWorld::fixed_tick`].
pub struct GravityWorld {
    pub bodies: Arena<BodyId, PhysicsBody>,
    sources: Arena<SourceId, GravitySource>,
    /// Tracker components, looked up by body handle.
    objects: BTreeMap<BodyId, GravityObject>,
    tracker: InfluenceTracker,
    attraction: AttractionEngine,
    overlaps: OverlapMonitor,
    integrator: Integrator,
    config: GravityConfig,
    warnings: WarnOnce,
    time_accumulated: f32,
    tick_count: u64,
    last_stats: AttractionStats,
}

impl Default for GravityWorld {
    fn default() -> Self {
        Self::build(GravityConfig::default())
    }
}

impl GravityWorld {
    pub fn new(config: GravityConfig) -> GravityResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GravityConfig) -> Self {
        let mut attraction = AttractionEngine::new();
        attraction.set_parallel(config.parallel);
        Self {
            bodies: Arena::new(),
            sources: Arena::new(),
            objects: BTreeMap::new(),
            tracker: InfluenceTracker::new(),
            attraction,
            overlaps: OverlapMonitor::new(),
            integrator: Integrator::new(config.time_step, 1),
            config,
            warnings: WarnOnce::new(),
            time_accumulated: 0.0,
            tick_count: 0,
            last_stats: AttractionStats::default(),
        }
    }

    pub fn config(&self) -> &GravityConfig {
        &self.config
    }

    pub fn set_ambient_gravity(&mut self, gravity: Vec3) -> GravityResult<()> {
        if !gravity.is_finite() {
            return Err(GravityError::NonFiniteVector {
                field: "ambient_gravity",
            });
        }
        self.config.ambient_gravity = gravity;
        Ok(())
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.config.parallel = enabled;
        self.attraction.set_parallel(enabled);
    }

    pub fn tracker(&self) -> &InfluenceTracker {
        &self.tracker
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_attraction_stats(&self) -> AttractionStats {
        self.last_stats
    }

    // Bodies

    pub fn add_body(&mut self, body: PhysicsBody) -> BodyId {
        let id = self.bodies.insert(body);
        if let Some(stored) = self.bodies.get_mut(id) {
            stored.id = id;
        }
        id
    }

    pub fn body(&self, id: BodyId) -> Option<&PhysicsBody> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut PhysicsBody> {
        self.bodies.get_mut(id)
    }

    /// Tears a body down, dropping it from every source's tracked set.
    ///
    /// Sources attached to the body lose their actor: they are detached in
    /// place and disabled.
    pub fn remove_body(&mut self, id: BodyId) -> Option<PhysicsBody> {
        let body = self.bodies.remove(id)?;
        self.tracker.forget_body(id);
        self.overlaps.forget_body(id);
        self.objects.remove(&id);

        let source_ids: Vec<SourceId> = self.sources.ids().collect();
        for source_id in source_ids {
            let orphaned = match self.sources.get_mut(source_id) {
                Some(source) => source.release_body(id, &body),
                None => false,
            };
            if orphaned {
                self.warnings.warn(
                    format!("{source_id}:orphaned"),
                    format!("gravity source {source_id} lost its attached body {id}; disabling"),
                );
                self.deactivate_source(source_id);
            }
        }
        Some(body)
    }

    // Sources

    /// Initializes and enables a source described by `desc`.
    pub fn add_source(&mut self, desc: GravitySourceDesc) -> GravityResult<SourceId> {
        let source = desc.build(self.config.gravitational_constant)?;
        let id = self.sources.insert(source);
        if let Err(err) = self.init_source(id) {
            self.sources.remove(id);
            return Err(err);
        }
        self.enable_source(id)?;
        Ok(id)
    }

    fn init_source(&mut self, id: SourceId) -> GravityResult<()> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or(GravityError::UnknownSource(id))?;
        source.id = id;
        source.state = ComponentState::Initialized;

        match source.volume.as_mut() {
            Some(volume) => volume.is_trigger = true,
            None => {
                self.warnings.warn(
                    format!("{id}:volume"),
                    format!("gravity source {id} has no influence volume; it attracts nothing"),
                );
            }
        }

        if let Some(body_id) = source.attached_body {
            if !self.bodies.contains(body_id) {
                self.warnings.warn(
                    format!("{id}:attached"),
                    format!("gravity source {id} is attached to missing body {body_id}; detaching"),
                );
                source.attached_body = None;
            }
        }

        if source.coupling.authority() == MassAuthority::AttachedBody {
            match source.attached_body.and_then(|body| self.bodies.get_mut(body)) {
                Some(body) => {
                    let mass = source.coupling.cached_mass();
                    source.coupling.set_mass(mass, Some(body))?;
                }
                None => {
                    self.warnings.warn(
                        format!("{id}:authority"),
                        format!(
                            "gravity source {id} defers mass to an attached body but has none; using its own mass"
                        ),
                    );
                    source.coupling.set_authority(MassAuthority::Internal);
                }
            }
        }
        Ok(())
    }

    pub fn enable_source(&mut self, id: SourceId) -> GravityResult<()> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or(GravityError::UnknownSource(id))?;
        if source.state != ComponentState::Enabled {
            source.state = ComponentState::Enabled;
            self.overlaps.forget_source(id);
            debug!("gravity source {id} enabled");
        }
        Ok(())
    }

    /// Stops listening for overlaps and releases every tracked body symmetrically.
    pub fn disable_source(&mut self, id: SourceId) -> GravityResult<()> {
        if !self.sources.contains(id) {
            return Err(GravityError::UnknownSource(id));
        }
        self.deactivate_source(id);
        Ok(())
    }

    fn deactivate_source(&mut self, id: SourceId) {
        let Some(source) = self.sources.get_mut(id) else {
            return;
        };
        if source.state == ComponentState::Enabled {
            source.state = ComponentState::Disabled;
            let released = self.tracker.detach_source(id);
            self.overlaps.forget_source(id);
            debug!("gravity source {id} disabled, released {} bodies", released.len());
        }
    }

    /// Tears a source down.
    pub fn remove_source(&mut self, id: SourceId) -> GravityResult<GravitySource> {
        self.disable_source(id)?;
        self.tracker.detach_source(id);
        self.sources
            .remove(id)
            .ok_or(GravityError::UnknownSource(id))
    }

    pub fn source(&self, id: SourceId) -> Option<&GravitySource> {
        self.sources.get(id)
    }

    /// Mutable access for bias, mutual gravitation and placement edits.
    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut GravitySource> {
        self.sources.get_mut(id)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.sources.ids()
    }

    /// Reads a source's mass, resynchronising from its attached body first.
    pub fn source_mass(&mut self, id: SourceId) -> GravityResult<f32> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or(GravityError::UnknownSource(id))?;
        Ok(source.resolve_mass(&self.bodies))
    }

    pub fn set_source_mass(&mut self, id: SourceId, mass: f32) -> GravityResult<()> {
        let (source, body) = self.source_and_attached(id)?;
        source.coupling.set_mass(mass, body)
    }

    pub fn set_source_surface_gravity(&mut self, id: SourceId, surface_gravity: f32) -> GravityResult<()> {
        let (source, body) = self.source_and_attached(id)?;
        source.coupling.set_surface_gravity(surface_gravity, body)
    }

    pub fn set_source_surface_radius(&mut self, id: SourceId, surface_radius: f32) -> GravityResult<()> {
        let (source, body) = self.source_and_attached(id)?;
        source.coupling.set_surface_radius(surface_radius, body)
    }

    pub fn set_source_g_force(&mut self, id: SourceId, g_force: f32) -> GravityResult<()> {
        let (source, body) = self.source_and_attached(id)?;
        source.coupling.set_g_force(g_force, body)
    }

    fn source_and_attached(
        &mut self,
        id: SourceId,
    ) -> GravityResult<(&mut GravitySource, Option<&mut PhysicsBody>)> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or(GravityError::UnknownSource(id))?;
        let body = source.attached_body.and_then(|body| self.bodies.get_mut(body));
        Ok((source, body))
    }

    // Gravity objects

    /// Gives `body` a tracker component, registered under the body's handle.
    pub fn attach_gravity_object(&mut self, body: BodyId, mut object: GravityObject) -> GravityResult<()> {
        if !self.bodies.contains(body) {
            return Err(GravityError::UnknownBody(body));
        }
        object.state = ComponentState::Enabled;
        object.righting_state = RightingState::Stable;
        self.objects.insert(body, object);
        Ok(())
    }

    pub fn detach_gravity_object(&mut self, body: BodyId) -> Option<GravityObject> {
        self.objects.remove(&body)
    }

    pub fn set_gravity_object_enabled(&mut self, body: BodyId, enabled: bool) -> GravityResult<()> {
        let object = self
            .objects
            .get_mut(&body)
            .ok_or(GravityError::UnknownBody(body))?;
        object.state = if enabled {
            ComponentState::Enabled
        } else {
            ComponentState::Disabled
        };
        Ok(())
    }

    pub fn gravity_object(&self, body: BodyId) -> Option<&GravityObject> {
        self.objects.get(&body)
    }

    pub fn gravity_object_mut(&mut self, body: BodyId) -> Option<&mut GravityObject> {
        self.objects.get_mut(&body)
    }

    // Tracking protocol

    /// Delivers a volume-overlap signal from the host broadphase.
    pub fn handle_overlap(&mut self, event: OverlapEvent) -> OverlapOutcome {
        match event {
            OverlapEvent::Begin { source, body } => {
                let Some(gravity_source) = self.sources.get(source) else {
                    return OverlapOutcome::Rejected(RejectReason::SourceInactive);
                };
                self.tracker
                    .begin_overlap(gravity_source, body, self.bodies.get(body))
            }
            OverlapEvent::End { source, body } => self.tracker.end_overlap(source, body),
        }
    }

    pub fn tracked_bodies(&self, source: SourceId) -> Vec<BodyId> {
        self.tracker.snapshot_bodies(source)
    }

    pub fn sources_affecting(&self, body: BodyId) -> Vec<SourceId> {
        self.tracker.sources_of(body)
    }

    /// Whether any gravity source currently influences `body`.
    pub fn is_influenced(&self, body: BodyId) -> bool {
        self.tracker.is_influenced(body)
    }

    /// Whether any gravity acts on `body`: a source, or a non-zero ambient field.
    pub fn is_in_gravity(&self, body: BodyId) -> bool {
        self.is_influenced(body) || self.config.ambient_gravity.length_squared() > 0.0
    }

    /// Strongest single gravity candidate acting on `body` right now.
    pub fn compute_dominant_gravity(&mut self, body: BodyId) -> GravityResult<Vec3> {
        resolver::compute_dominant_gravity(
            body,
            &self.bodies,
            &mut self.sources,
            &self.tracker,
            &self.config,
        )
        .ok_or(GravityError::UnknownBody(body))
    }

    // Stepping

    /// Advances the simulation using a fixed timestep accumulator.
    pub fn step(&mut self, dt: f32) {
        self.time_accumulated += dt;

        while self.time_accumulated >= self.config.time_step {
            self.time_accumulated -= self.config.time_step;
            self.fixed_tick();
        }
    }

    /// One fixed tick: overlaps, ambient field, attraction, self-righting, integration.
    pub fn fixed_tick(&mut self) {
        self.tick_count += 1;

        if self.config.detect_overlaps {
            let _timer = ScopedTimer::new("overlaps::detect");
            let events = self.overlaps.detect(&self.sources, &self.bodies);
            for event in events {
                self.handle_overlap(event);
            }
        }

        self.apply_ambient_gravity();

        {
            let _timer = ScopedTimer::new("attraction");
            self.last_stats =
                self.attraction
                    .step(&mut self.sources, &mut self.bodies, &self.tracker, &self.config);
        }
        {
            let _timer = ScopedTimer::new("righting");
            self.update_gravity_objects();
        }
        {
            let _timer = ScopedTimer::new("integrator");
            self.integrator.step(&mut self.bodies);
        }
    }

    fn apply_ambient_gravity(&mut self) {
        let ambient = self.config.ambient_gravity;
        if ambient == Vec3::ZERO {
            return;
        }
        for body in self.bodies.values_mut() {
            if body.gravity_enabled {
                body.apply_force(ambient, ForceMode::Acceleration);
            }
        }
    }

    fn update_gravity_objects(&mut self) {
        let dt = self.config.time_step;
        let tolerance = self.config.alignment_tolerance;

        for (body_id, object) in self.objects.iter_mut() {
            if !object.is_enabled() {
                continue;
            }
            let Some(dominant) = resolver::compute_dominant_gravity(
                *body_id,
                &self.bodies,
                &mut self.sources,
                &self.tracker,
                &self.config,
            ) else {
                continue;
            };
            object.dominant_gravity = dominant;

            if !object.self_right {
                object.righting_state = RightingState::Stable;
                continue;
            }
            let Some(body) = self.bodies.get_mut(*body_id) else {
                continue;
            };
            let (state, rotation) = resolver::self_right(
                body.transform.rotation,
                dominant,
                object.blend_fraction(dt),
                tolerance,
            );
            object.righting_state = state;
            body.transform.rotation = rotation;
        }
    }
}
