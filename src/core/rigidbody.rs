use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::types::{ForceMode, MassProperties, Transform, Velocity};
use crate::error::{ensure_finite, GravityError, GravityResult};
use crate::utils::allocator::BodyId;

/// Whether the host simulates a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Integrated and pushed around by forces.
    #[default]
    Dynamic,
    /// Moved by the host directly; still a physics body but ignores forces.
    Kinematic,
    /// Scenery collider without a dynamic-physics representation.
    Static,
}

/// Host-side physics body. Gravity components reference it by [`BodyId`], never own it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub id: BodyId,
    pub transform: Transform,
    pub velocity: Velocity,
    /// Acceleration accumulated during the current tick.
    pub acceleration: Vec3,
    pub kind: BodyKind,
    /// Bounding radius used by overlap tests.
    pub radius: f32,
    /// Whether gravity (ambient and sources) acts on this body.
    pub gravity_enabled: bool,
    pub linear_damping: f32,
    pub angular_damping: f32,
    mass_properties: MassProperties,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            id: BodyId::from_index(u32::MAX),
            transform: Transform::default(),
            velocity: Velocity::default(),
            acceleration: Vec3::ZERO,
            kind: BodyKind::Dynamic,
            radius: 0.0,
            gravity_enabled: true,
            linear_damping: 0.0,
            angular_damping: 0.0,
            mass_properties: MassProperties::default(),
        }
    }
}

impl PhysicsBody {
    pub fn new(position: Vec3, mass: f32) -> Self {
        Self {
            transform: Transform::from_position(position),
            mass_properties: MassProperties { mass },
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass_properties.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.mass_properties.inverse_mass()
    }

    pub fn set_mass(&mut self, mass: f32) -> GravityResult<()> {
        ensure_finite("mass", mass)?;
        if mass < 0.0 {
            return Err(GravityError::NegativeMass(mass));
        }
        self.mass_properties.mass = mass;
        Ok(())
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Whether the host simulates this body at all (dynamic or kinematic).
    pub fn is_simulated(&self) -> bool {
        self.kind != BodyKind::Static
    }

    /// Applies `vector` according to `mode`. Non-dynamic bodies ignore it.
    pub fn apply_force(&mut self, vector: Vec3, mode: ForceMode) {
        if !self.is_dynamic() {
            return;
        }
        match mode {
            ForceMode::Force => self.acceleration += vector * self.inverse_mass(),
            ForceMode::Acceleration => self.acceleration += vector,
            ForceMode::Impulse => self.velocity.linear += vector * self.inverse_mass(),
            ForceMode::VelocityChange => self.velocity.linear += vector,
        }
    }
}
