use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::types::Transform;
use crate::error::{GravityError, GravityResult};

/// Geometry of an influence volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VolumeShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl VolumeShape {
    pub fn bounding_radius(&self) -> f32 {
        match self {
            VolumeShape::Sphere { radius } => *radius,
            VolumeShape::Box { half_extents } => half_extents.length(),
        }
    }
}

/// Trigger geometry bounding where a source attracts, placed relative to the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluenceVolume {
    pub shape: VolumeShape,
    pub offset: Transform,
    pub is_trigger: bool,
}

impl InfluenceVolume {
    pub fn sphere(radius: f32) -> Self {
        Self::from_shape(VolumeShape::Sphere { radius })
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::from_shape(VolumeShape::Box { half_extents })
    }

    fn from_shape(shape: VolumeShape) -> Self {
        Self {
            shape,
            offset: Transform::default(),
            is_trigger: true,
        }
    }

    pub fn with_offset(mut self, offset: Transform) -> Self {
        self.offset = offset;
        self
    }

    pub fn validate(&self) -> GravityResult<()> {
        match self.shape {
            VolumeShape::Sphere { radius } => {
                if !radius.is_finite() {
                    return Err(GravityError::NonFinite {
                        field: "volume radius",
                        value: radius,
                    });
                }
                if radius <= 0.0 {
                    return Err(GravityError::NonPositive {
                        field: "volume radius",
                        value: radius,
                    });
                }
            }
            VolumeShape::Box { half_extents } => {
                if !half_extents.is_finite() {
                    return Err(GravityError::NonFiniteVector {
                        field: "volume half extents",
                    });
                }
                let smallest = half_extents.min_element();
                if smallest <= 0.0 {
                    return Err(GravityError::NonPositive {
                        field: "volume half extents",
                        value: smallest,
                    });
                }
            }
        }
        Ok(())
    }

    /// World transform of the volume for a source sitting at `owner`.
    pub fn world_transform(&self, owner: &Transform) -> Transform {
        Transform {
            position: owner.position + owner.rotation * self.offset.position,
            rotation: (owner.rotation * self.offset.rotation).normalize(),
        }
    }

    /// Whether a sphere of `radius` centred at `point` touches the volume.
    pub fn overlaps_sphere(&self, owner: &Transform, point: Vec3, radius: f32) -> bool {
        let world = self.world_transform(owner);
        let reach = self.shape.bounding_radius() + radius;
        if world.position.distance_squared(point) > reach * reach {
            return false;
        }

        match self.shape {
            VolumeShape::Sphere { .. } => true,
            VolumeShape::Box { half_extents } => {
                let local = world.inverse_transform_point(point);
                let closest = local.clamp(-half_extents, half_extents);
                local.distance_squared(closest) <= radius * radius
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn sphere_overlap_counts_body_radius() {
        let volume = InfluenceVolume::sphere(10.0);
        let owner = Transform::from_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(volume.overlaps_sphere(&owner, Vec3::new(15.0, 0.0, 0.0), 0.0));
        assert!(volume.overlaps_sphere(&owner, Vec3::new(16.0, 0.0, 0.0), 1.5));
        assert!(!volume.overlaps_sphere(&owner, Vec3::new(16.0, 0.0, 0.0), 0.5));
    }

    #[test]
    fn box_overlap_respects_owner_rotation() {
        let volume = InfluenceVolume::cuboid(Vec3::new(10.0, 1.0, 1.0));
        let rotated = Transform::from_position_rotation(
            Vec3::ZERO,
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        );
        let point = Vec3::new(0.0, 8.0, 0.0);
        assert!(volume.overlaps_sphere(&rotated, point, 0.0));
        assert!(!volume.overlaps_sphere(&Transform::default(), point, 0.0));
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        assert!(InfluenceVolume::sphere(0.0).validate().is_err());
        assert!(InfluenceVolume::cuboid(Vec3::new(1.0, 0.0, 1.0))
            .validate()
            .is_err());
        assert!(InfluenceVolume::sphere(f32::INFINITY).validate().is_err());
        assert!(InfluenceVolume::sphere(3.0).validate().is_ok());
    }
}
