//! Rigid body integration functions.

use glam::Vec2;

use crate::ecs::components::physics::{RigidBody, RigidBodyType};

/// Apply gravity force to all dynamic rigid bodies.
pub fn apply_gravity(world: &mut hecs::World, gravity: Vec2) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        if rb.is_dynamic() && rb.mass() > 0.0 {
            rb.force_accumulator += gravity * rb.mass() * rb.gravity_scale;
        }
    }
}

/// Integrate velocities using semi-implicit Euler: v += (F/m) * dt.
pub fn integrate_velocities(world: &mut hecs::World, dt: f32) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        if !rb.is_dynamic() || !rb.has_finite_mass() {
            continue;
        }

        rb.linear_velocity += rb.force_accumulator * rb.inv_mass() * dt;
        rb.angular_velocity += rb.torque_accumulator * rb.inv_inertia() * dt;

        rb.linear_velocity *= (1.0 - rb.linear_damping * dt).max(0.0);
        rb.angular_velocity *= (1.0 - rb.angular_damping * dt).max(0.0);
    }
}

/// Integrate positions: p += v * dt, angle += omega * dt.
///
/// Kinematic bodies move along their velocity; static bodies never move.
pub fn integrate_positions(world: &mut hecs::World, dt: f32) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        if rb.body_type == RigidBodyType::Static {
            continue;
        }
        rb.position += rb.linear_velocity * dt;
        rb.angle += rb.angular_velocity * dt;
    }
}

/// Clear force and torque accumulators on all rigid bodies.
pub fn clear_forces(world: &mut hecs::World) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        rb.force_accumulator = Vec2::ZERO;
        rb.torque_accumulator = 0.0;
    }
}
