//! Gravity Wells – localized gravity for real-time physics loops.
//!
//! Gravity sources attract the dynamic bodies inside their influence
//! volumes, keep a mirrored record of which bodies they affect, and let
//! attracted bodies right themselves toward the strongest gravity acting on
//! them. Everything runs on the fixed tick of a [`GravityWorld`].

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod gravity;
pub mod utils;
pub mod world;

pub use glam::{Quat, Vec3};

pub use config::GravityConfig;
pub use core::{
    rigidbody::{BodyKind, PhysicsBody},
    types::{ForceMode, MassProperties, Transform, Velocity},
    volume::{InfluenceVolume, VolumeShape},
};
pub use dynamics::attraction::{AttractionEngine, AttractionStats};
pub use error::{GravityError, GravityResult};
pub use gravity::{
    coupling::{MassAuthority, MassGravityCoupling},
    object::{GravityObject, RightingBlend, RightingState},
    source::{GravitySource, GravitySourceDesc},
    tracking::{InfluenceTracker, OverlapEvent, OverlapOutcome, RejectReason},
    ComponentState,
};
pub use utils::allocator::{BodyId, SourceId};
pub use world::GravityWorld;

/// High-level convenience wrapper that owns a [`GravityWorld`].
pub struct GravityEngine {
    world: GravityWorld,
}

impl Default for GravityEngine {
    fn default() -> Self {
        Self {
            world: GravityWorld::default(),
        }
    }
}

impl GravityEngine {
    /// Creates an engine with default configuration and the provided fixed timestep.
    pub fn new(timestep: f32) -> GravityResult<Self> {
        Self::with_config(GravityConfig {
            time_step: timestep,
            ..GravityConfig::default()
        })
    }

    pub fn with_config(config: GravityConfig) -> GravityResult<Self> {
        Ok(Self {
            world: GravityWorld::new(config)?,
        })
    }

    /// Adds a physics body and returns its handle.
    pub fn add_body(&mut self, body: PhysicsBody) -> BodyId {
        self.world.add_body(body)
    }

    /// Adds, initializes and enables a gravity source.
    pub fn add_source(&mut self, desc: GravitySourceDesc) -> GravityResult<SourceId> {
        self.world.add_source(desc)
    }

    /// Gives a body a tracker so it resolves dominant gravity (and optionally self-rights).
    pub fn attach_gravity_object(&mut self, body: BodyId, object: GravityObject) -> GravityResult<()> {
        self.world.attach_gravity_object(body, object)
    }

    /// Advances the simulation by the provided delta time.
    pub fn step(&mut self, dt: f32) {
        self.world.step(dt);
    }

    /// Dominant gravity vector found for `body` on the last fixed tick.
    pub fn dominant_gravity(&self, body: BodyId) -> Option<Vec3> {
        self.world
            .gravity_object(body)
            .map(GravityObject::dominant_gravity)
    }

    /// Whether any gravity source currently influences `body`.
    pub fn is_influenced(&self, body: BodyId) -> bool {
        self.world.is_influenced(body)
    }

    pub fn get_body(&self, id: BodyId) -> Option<&PhysicsBody> {
        self.world.body(id)
    }

    pub fn world(&self) -> &GravityWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GravityWorld {
        &mut self.world
    }
}
