use glam::{Quat, Vec3};

use crate::core::rigidbody::{BodyKind, PhysicsBody};
use crate::utils::allocator::{Arena, BodyId};

/// Semi-implicit Euler integrator standing in for the host engine's.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub dt: f32,
    pub substeps: u32,
}

impl Integrator {
    pub fn new(dt: f32, substeps: u32) -> Self {
        let substeps = substeps.max(1);
        Self {
            dt: dt / substeps as f32,
            substeps,
        }
    }

    pub fn integrate_velocity(&self, body: &mut PhysicsBody, dt: f32) {
        if body.kind != BodyKind::Dynamic {
            return;
        }

        body.velocity.linear += body.acceleration * dt;
        body.velocity.linear *= (1.0 - body.linear_damping * dt).max(0.0);
        body.velocity.angular *= (1.0 - body.angular_damping * dt).max(0.0);
    }

    pub fn integrate_position(&self, body: &mut PhysicsBody, dt: f32) {
        if body.kind == BodyKind::Static {
            return;
        }

        body.transform.position += body.velocity.linear * dt;

        let omega_mag = body.velocity.angular.length();
        if omega_mag > 1e-6 {
            let axis = body.velocity.angular / omega_mag;
            let delta = Quat::from_axis_angle(axis, omega_mag * dt);
            body.transform.rotation = (delta * body.transform.rotation).normalize();
        }
    }

    /// Advances every body one fixed tick and clears the accumulated acceleration.
    pub fn step(&self, bodies: &mut Arena<BodyId, PhysicsBody>) {
        for _ in 0..self.substeps {
            for body in bodies.values_mut() {
                self.integrate_velocity(body, self.dt);
                self.integrate_position(body, self.dt);
            }
        }
        for body in bodies.values_mut() {
            body.acceleration = Vec3::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_acceleration_moves_body() {
        let mut bodies = Arena::new();
        let mut body = PhysicsBody::new(Vec3::ZERO, 1.0);
        body.acceleration = Vec3::new(0.0, -10.0, 0.0);
        let id = bodies.insert(body);

        Integrator::new(0.1, 1).step(&mut bodies);

        let body = bodies.get(id).unwrap();
        assert!((body.velocity.linear.y + 1.0).abs() < 1e-6);
        assert!((body.transform.position.y + 0.1).abs() < 1e-6);
        assert_eq!(body.acceleration, Vec3::ZERO);
    }

    #[test]
    fn static_bodies_stay_put() {
        let mut bodies = Arena::new();
        let mut body = PhysicsBody::new(Vec3::ONE, 1.0).with_kind(BodyKind::Static);
        body.velocity.linear = Vec3::X;
        let id = bodies.insert(body);

        Integrator::new(0.1, 2).step(&mut bodies);
        assert_eq!(bodies.get(id).unwrap().transform.position, Vec3::ONE);
    }
}
