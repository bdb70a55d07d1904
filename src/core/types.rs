use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// World-space direction of the local +Y axis.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// World-space direction of the local -Y axis.
    pub fn down(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Y
    }

    /// Expresses a world-space point in this transform's local frame.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }
}

/// Linear and angular velocity of a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

/// Scalar mass of a body. A zero mass marks an immovable body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    pub mass: f32,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self { mass: 1.0 }
    }
}

impl MassProperties {
    pub fn inverse_mass(&self) -> f32 {
        if self.mass.abs() < f32::EPSILON {
            0.0
        } else {
            1.0 / self.mass
        }
    }
}

/// How a vector handed to [`crate::PhysicsBody::apply_force`] is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceMode {
    /// Continuous force, scaled by inverse mass and integrated over the tick.
    #[default]
    Force,
    /// Continuous acceleration, independent of mass.
    Acceleration,
    /// Instant change in momentum.
    Impulse,
    /// Instant change in velocity, independent of mass.
    VelocityChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_and_down_follow_rotation() {
        let transform = Transform::from_position_rotation(
            Vec3::ZERO,
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        );
        assert!(transform.up().abs_diff_eq(Vec3::NEG_X, 1e-6));
        assert!(transform.down().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn zero_mass_has_zero_inverse() {
        assert_eq!(MassProperties { mass: 0.0 }.inverse_mass(), 0.0);
        assert_eq!(MassProperties { mass: 4.0 }.inverse_mass(), 0.25);
    }
}
