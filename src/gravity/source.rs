use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::coupling::{MassAuthority, MassGravityCoupling};
use super::ComponentState;
use crate::config::{DEFAULT_SURFACE_GRAVITY, DEFAULT_SURFACE_RADIUS};
use crate::core::{rigidbody::PhysicsBody, types::Transform, volume::InfluenceVolume};
use crate::error::{ensure_finite, GravityError, GravityResult};
use crate::utils::allocator::{Arena, BodyId, SourceId};

/// Configuration surface of a gravity source.
///
/// At most two of `mass`, `surface_gravity` and `surface_radius` may be set;
/// the third is derived. Unset values fall back to 1 g at a radius of
/// [`DEFAULT_SURFACE_RADIUS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravitySourceDesc {
    pub mass_authority: MassAuthority,
    pub mass: Option<f32>,
    pub surface_gravity: Option<f32>,
    pub surface_radius: Option<f32>,
    pub directional_bias: Vec3,
    pub mutual_gravitation: bool,
    pub volume: Option<InfluenceVolume>,
    pub transform: Transform,
    #[serde(skip)]
    pub attached_body: Option<BodyId>,
    #[serde(skip)]
    pub child_bodies: Vec<BodyId>,
}

impl Default for GravitySourceDesc {
    fn default() -> Self {
        Self {
            mass_authority: MassAuthority::default(),
            mass: None,
            surface_gravity: None,
            surface_radius: None,
            directional_bias: Vec3::ONE,
            mutual_gravitation: false,
            volume: None,
            transform: Transform::default(),
            attached_body: None,
            child_bodies: Vec::new(),
        }
    }
}

impl GravitySourceDesc {
    pub fn surface(mut self, surface_gravity: f32, surface_radius: f32) -> Self {
        self.mass = None;
        self.surface_gravity = Some(surface_gravity);
        self.surface_radius = Some(surface_radius);
        self
    }

    pub fn mass_and_radius(mut self, mass: f32, surface_radius: f32) -> Self {
        self.mass = Some(mass);
        self.surface_gravity = None;
        self.surface_radius = Some(surface_radius);
        self
    }

    pub fn mass_authority(mut self, authority: MassAuthority) -> Self {
        self.mass_authority = authority;
        self
    }

    pub fn directional_bias(mut self, bias: Vec3) -> Self {
        self.directional_bias = bias;
        self
    }

    pub fn mutual_gravitation(mut self, enabled: bool) -> Self {
        self.mutual_gravitation = enabled;
        self
    }

    pub fn volume(mut self, volume: InfluenceVolume) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn attached_to(mut self, body: BodyId) -> Self {
        self.attached_body = Some(body);
        self
    }

    /// Marks `body` as one of the source's own colliders; its overlaps are ignored.
    pub fn child_body(mut self, body: BodyId) -> Self {
        self.child_bodies.push(body);
        self
    }

    /// Resolves the coupling triple from whichever pair was configured.
    pub fn coupling(&self, gravitational_constant: f32) -> GravityResult<MassGravityCoupling> {
        let coupling = match (self.mass, self.surface_gravity, self.surface_radius) {
            (Some(_), Some(_), Some(_)) => return Err(GravityError::OverdeterminedCoupling),
            (Some(mass), Some(surface_gravity), None) => {
                ensure_finite("surface gravity", surface_gravity)?;
                if surface_gravity <= 0.0 {
                    return Err(GravityError::NonPositive {
                        field: "surface gravity",
                        value: surface_gravity,
                    });
                }
                let radius = (gravitational_constant * mass / surface_gravity).sqrt();
                MassGravityCoupling::from_mass(mass, radius, gravitational_constant)?
            }
            (Some(mass), None, radius) => MassGravityCoupling::from_mass(
                mass,
                radius.unwrap_or(DEFAULT_SURFACE_RADIUS),
                gravitational_constant,
            )?,
            (None, surface_gravity, radius) => MassGravityCoupling::from_surface(
                surface_gravity.unwrap_or(DEFAULT_SURFACE_GRAVITY),
                radius.unwrap_or(DEFAULT_SURFACE_RADIUS),
                gravitational_constant,
            )?,
        };
        Ok(coupling.with_authority(self.mass_authority))
    }

    pub fn build(&self, gravitational_constant: f32) -> GravityResult<GravitySource> {
        validate_bias(self.directional_bias)?;
        if let Some(volume) = &self.volume {
            volume.validate()?;
        }
        Ok(GravitySource {
            id: SourceId::from_index(u32::MAX),
            transform: self.transform,
            attached_body: self.attached_body,
            child_bodies: self.child_bodies.iter().copied().collect(),
            volume: self.volume,
            directional_bias: self.directional_bias,
            mutual_gravitation: self.mutual_gravitation,
            coupling: self.coupling(gravitational_constant)?,
            state: ComponentState::Initialized,
        })
    }
}

/// An attracting region: coupled mass model plus a bounded influence volume.
#[derive(Debug, Clone)]
pub struct GravitySource {
    pub(crate) id: SourceId,
    /// Placement used when no body is attached.
    pub transform: Transform,
    pub(crate) attached_body: Option<BodyId>,
    pub(crate) child_bodies: HashSet<BodyId>,
    pub(crate) volume: Option<InfluenceVolume>,
    directional_bias: Vec3,
    mutual_gravitation: bool,
    pub(crate) coupling: MassGravityCoupling,
    pub(crate) state: ComponentState,
}

impl GravitySource {
    pub fn builder() -> GravitySourceDesc {
        GravitySourceDesc::default()
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn state(&self) -> ComponentState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    pub fn attached_body(&self) -> Option<BodyId> {
        self.attached_body
    }

    pub fn volume(&self) -> Option<&InfluenceVolume> {
        self.volume.as_ref()
    }

    pub fn coupling(&self) -> &MassGravityCoupling {
        &self.coupling
    }

    pub fn directional_bias(&self) -> Vec3 {
        self.directional_bias
    }

    pub fn set_directional_bias(&mut self, bias: Vec3) -> GravityResult<()> {
        validate_bias(bias)?;
        self.directional_bias = bias;
        Ok(())
    }

    pub fn mutual_gravitation(&self) -> bool {
        self.mutual_gravitation
    }

    pub fn set_mutual_gravitation(&mut self, enabled: bool) {
        self.mutual_gravitation = enabled;
    }

    /// Whether `body` belongs to this source (its attached body or one of its colliders).
    pub fn owns_body(&self, body: BodyId) -> bool {
        self.attached_body == Some(body) || self.child_bodies.contains(&body)
    }

    /// Where the source sits: on its attached body when that resolves, else its own transform.
    pub fn world_transform(&self, bodies: &Arena<BodyId, PhysicsBody>) -> Transform {
        self.attached_body
            .and_then(|id| bodies.get(id))
            .map(|body| body.transform)
            .unwrap_or(self.transform)
    }

    /// Current mass, resynchronised from the attached body when it owns the value.
    pub fn resolve_mass(&mut self, bodies: &Arena<BodyId, PhysicsBody>) -> f32 {
        let attached = self.attached_body.and_then(|id| bodies.get(id));
        self.coupling.mass(attached)
    }

    /// Body receiving the reciprocal force, if mutual gravitation applies.
    pub(crate) fn reciprocal_body(&self, bodies: &Arena<BodyId, PhysicsBody>) -> Option<BodyId> {
        if !self.mutual_gravitation {
            return None;
        }
        self.attached_body
            .filter(|id| bodies.get(*id).map(PhysicsBody::is_dynamic).unwrap_or(false))
    }

    /// Severs every link to the torn-down `body`.
    ///
    /// An attached source keeps the body's last pose and mass as its own and
    /// owns its mass from then on. Returns whether `body` was the attached body.
    pub(crate) fn release_body(&mut self, body_id: BodyId, body: &PhysicsBody) -> bool {
        self.child_bodies.remove(&body_id);
        if self.attached_body != Some(body_id) {
            return false;
        }
        self.coupling.mass(Some(body));
        self.coupling.set_authority(MassAuthority::Internal);
        self.transform = body.transform;
        self.attached_body = None;
        true
    }
}

fn validate_bias(bias: Vec3) -> GravityResult<()> {
    if bias.is_finite() {
        Ok(())
    } else {
        Err(GravityError::NonFiniteVector {
            field: "directional bias",
        })
    }
}
