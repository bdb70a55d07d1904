//! Mass / surface-gravity / surface-radius coupling of a gravity source.
//!
//! Two of the three quantities are set, the third is derived:
//!
//! `mass = surface_gravity * radius² / G`
//!
//! With [`MassAuthority::AttachedBody`] the attached body's mass is the
//! source of truth and surface gravity is re-derived whenever it drifts.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EARTH_SURFACE_GRAVITY;
use crate::core::rigidbody::PhysicsBody;
use crate::error::{ensure_finite, GravityError, GravityResult};

/// Who owns the mass value of a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassAuthority {
    /// The coupling keeps its own mass.
    Internal,
    /// The mass lives on the attached dynamic body.
    #[default]
    AttachedBody,
}

/// `m = g·r² / G`
pub fn mass_for_surface_gravity(surface_gravity: f32, radius: f32, g_const: f32) -> f32 {
    surface_gravity * radius * radius / g_const
}

/// `g = G·m / r²`
pub fn surface_gravity_for_mass(mass: f32, radius: f32, g_const: f32) -> f32 {
    g_const * mass / (radius * radius)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassGravityCoupling {
    gravitational_constant: f32,
    mass: f32,
    surface_gravity: f32,
    surface_radius: f32,
    authority: MassAuthority,
}

impl MassGravityCoupling {
    /// Builds a coupling from surface gravity and radius; mass is derived.
    pub fn from_surface(
        surface_gravity: f32,
        surface_radius: f32,
        gravitational_constant: f32,
    ) -> GravityResult<Self> {
        validate_constant(gravitational_constant)?;
        validate_surface_gravity(surface_gravity)?;
        validate_radius(surface_radius)?;
        let mass = derived_mass(surface_gravity, surface_radius, gravitational_constant)?;
        Ok(Self {
            gravitational_constant,
            mass,
            surface_gravity,
            surface_radius,
            authority: MassAuthority::Internal,
        })
    }

    /// Builds a coupling from mass and radius; surface gravity is derived.
    pub fn from_mass(
        mass: f32,
        surface_radius: f32,
        gravitational_constant: f32,
    ) -> GravityResult<Self> {
        validate_constant(gravitational_constant)?;
        validate_mass(mass)?;
        validate_radius(surface_radius)?;
        Ok(Self {
            gravitational_constant,
            mass,
            surface_gravity: surface_gravity_for_mass(mass, surface_radius, gravitational_constant),
            surface_radius,
            authority: MassAuthority::Internal,
        })
    }

    pub fn with_authority(mut self, authority: MassAuthority) -> Self {
        self.authority = authority;
        self
    }

    pub fn authority(&self) -> MassAuthority {
        self.authority
    }

    pub fn set_authority(&mut self, authority: MassAuthority) {
        self.authority = authority;
    }

    pub fn gravitational_constant(&self) -> f32 {
        self.gravitational_constant
    }

    pub fn surface_gravity(&self) -> f32 {
        self.surface_gravity
    }

    pub fn surface_radius(&self) -> f32 {
        self.surface_radius
    }

    /// Last mass known to the coupling, without consulting an attached body.
    pub fn cached_mass(&self) -> f32 {
        self.mass
    }

    /// Surface gravity expressed in multiples of Earth gravity.
    pub fn g_force(&self) -> f32 {
        self.surface_gravity / EARTH_SURFACE_GRAVITY
    }

    /// Reads the mass, resynchronising from the attached body first when it owns the value.
    pub fn mass(&mut self, attached: Option<&PhysicsBody>) -> f32 {
        if let Some(body) = self.authoritative_body(attached) {
            let body_mass = body.mass();
            if body_mass != self.mass {
                debug!(
                    "attached body {} mass drifted {} -> {}, resyncing surface gravity",
                    body.id, self.mass, body_mass
                );
                self.mass = body_mass;
                self.surface_gravity = surface_gravity_for_mass(
                    body_mass,
                    self.surface_radius,
                    self.gravitational_constant,
                );
            }
        }
        self.mass
    }

    /// Sets the mass (writing it to the attached body when it owns the value)
    /// and re-derives surface gravity.
    pub fn set_mass(&mut self, mass: f32, attached: Option<&mut PhysicsBody>) -> GravityResult<()> {
        validate_mass(mass)?;
        let surface_gravity =
            surface_gravity_for_mass(mass, self.surface_radius, self.gravitational_constant);
        ensure_finite("derived surface gravity", surface_gravity)?;
        self.commit_mass(mass, attached)?;
        self.surface_gravity = surface_gravity;
        Ok(())
    }

    /// Sets surface gravity and re-derives mass.
    pub fn set_surface_gravity(
        &mut self,
        surface_gravity: f32,
        attached: Option<&mut PhysicsBody>,
    ) -> GravityResult<()> {
        validate_surface_gravity(surface_gravity)?;
        let mass = derived_mass(surface_gravity, self.surface_radius, self.gravitational_constant)?;
        self.commit_mass(mass, attached)?;
        self.surface_gravity = surface_gravity;
        Ok(())
    }

    /// Sets the surface radius and re-derives mass; surface gravity is unchanged.
    pub fn set_surface_radius(
        &mut self,
        surface_radius: f32,
        attached: Option<&mut PhysicsBody>,
    ) -> GravityResult<()> {
        validate_radius(surface_radius)?;
        let mass = derived_mass(self.surface_gravity, surface_radius, self.gravitational_constant)?;
        self.commit_mass(mass, attached)?;
        self.surface_radius = surface_radius;
        Ok(())
    }

    pub fn set_g_force(&mut self, g_force: f32, attached: Option<&mut PhysicsBody>) -> GravityResult<()> {
        ensure_finite("g force", g_force)?;
        self.set_surface_gravity(g_force * EARTH_SURFACE_GRAVITY, attached)
    }

    fn commit_mass(&mut self, mass: f32, attached: Option<&mut PhysicsBody>) -> GravityResult<()> {
        if self.authority == MassAuthority::AttachedBody {
            if let Some(body) = attached {
                body.set_mass(mass)?;
            }
        }
        self.mass = mass;
        Ok(())
    }

    fn authoritative_body<'a>(&self, attached: Option<&'a PhysicsBody>) -> Option<&'a PhysicsBody> {
        match self.authority {
            MassAuthority::AttachedBody => attached,
            MassAuthority::Internal => None,
        }
    }
}

fn derived_mass(surface_gravity: f32, radius: f32, g_const: f32) -> GravityResult<f32> {
    ensure_finite(
        "derived mass",
        mass_for_surface_gravity(surface_gravity, radius, g_const),
    )
}

fn validate_constant(g_const: f32) -> GravityResult<()> {
    ensure_finite("gravitational constant", g_const)?;
    if g_const <= 0.0 {
        return Err(GravityError::NonPositive {
            field: "gravitational constant",
            value: g_const,
        });
    }
    Ok(())
}

fn validate_mass(mass: f32) -> GravityResult<()> {
    ensure_finite("mass", mass)?;
    if mass < 0.0 {
        return Err(GravityError::NegativeMass(mass));
    }
    Ok(())
}

fn validate_surface_gravity(surface_gravity: f32) -> GravityResult<()> {
    ensure_finite("surface gravity", surface_gravity)?;
    if surface_gravity < 0.0 {
        return Err(GravityError::NegativeSurfaceGravity(surface_gravity));
    }
    Ok(())
}

fn validate_radius(radius: f32) -> GravityResult<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GravityError::NonPositiveRadius(radius));
    }
    Ok(())
}
