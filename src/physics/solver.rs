//! Sequential impulse constraint solver.
//!
//! Bodies touched by the step's manifolds are copied into a local buffer,
//! every manifold is resolved against that buffer strictly in order, and the
//! buffer is written back to the world once at the end. A body shared by
//! several manifolds therefore sees every earlier update within the step.

use std::collections::HashMap;

use glam::Vec2;
use tracing::trace;

use crate::ecs::components::physics::RigidBody;
use crate::math;

use super::contact::ContactManifold;

/// Tuning for the contact solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Fraction of the penetration removed per step by positional correction. Default: 0.2.
    pub position_correction: f32,
    /// Penetration allowed before positional correction kicks in. Default: 0.01.
    pub penetration_slop: f32,
    /// Reapply last step's impulses before iterating. Default: true.
    pub warm_starting: bool,
    /// Approach speed at or below which a contact gets no restitution, so
    /// resting bodies do not jitter. Zero keeps every contact fully
    /// restitutive. Default: 0.2.
    pub restitution_threshold: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            position_correction: 0.2,
            penetration_slop: 0.01,
            warm_starting: true,
            restitution_threshold: 0.2,
        }
    }
}

struct ContactConstraint {
    point: Vec2,
    r_a: Vec2,
    r_b: Vec2,
    normal_mass: f32,
    tangent_mass: f32,
    velocity_bias: f32,
    normal_impulse: f32,
    tangent_impulse: f32,
}

struct ManifoldConstraint {
    index: usize,
    slot_a: usize,
    slot_b: usize,
    normal: Vec2,
    tangent: Vec2,
    friction: f32,
    depth: f32,
    contacts: Vec<ContactConstraint>,
}

/// Bodies involved in the current solve, keyed by entity.
struct BodyBuffer {
    slots: HashMap<hecs::Entity, usize>,
    entities: Vec<hecs::Entity>,
    bodies: Vec<RigidBody>,
}

impl BodyBuffer {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            entities: Vec::new(),
            bodies: Vec::new(),
        }
    }

    fn slot(&mut self, world: &hecs::World, entity: hecs::Entity) -> Option<usize> {
        if let Some(&slot) = self.slots.get(&entity) {
            return Some(slot);
        }
        let body = world.get::<&RigidBody>(entity).ok().map(|rb| *rb)?;
        let slot = self.bodies.len();
        self.slots.insert(entity, slot);
        self.entities.push(entity);
        self.bodies.push(body);
        Some(slot)
    }

    /// Mutable access to two distinct slots.
    fn pair_mut(&mut self, a: usize, b: usize) -> (&mut RigidBody, &mut RigidBody) {
        debug_assert_ne!(a, b);
        if a < b {
            let (lo, hi) = self.bodies.split_at_mut(b);
            (&mut lo[a], &mut hi[0])
        } else {
            let (lo, hi) = self.bodies.split_at_mut(a);
            (&mut hi[0], &mut lo[b])
        }
    }

    fn commit(self, world: &mut hecs::World) {
        for (entity, body) in self.entities.into_iter().zip(self.bodies) {
            if let Ok(mut rb) = world.get::<&mut RigidBody>(entity) {
                *rb = body;
            }
        }
    }
}

#[inline]
fn effective_mass(a: &RigidBody, b: &RigidBody, r_a: Vec2, r_b: Vec2, axis: Vec2) -> f32 {
    let rn_a = math::cross(r_a, axis);
    let rn_b = math::cross(r_b, axis);
    let k = a.inv_mass()
        + b.inv_mass()
        + a.inv_inertia() * rn_a * rn_a
        + b.inv_inertia() * rn_b * rn_b;
    if k > 0.0 {
        1.0 / k
    } else {
        0.0
    }
}

#[inline]
fn relative_velocity(a: &RigidBody, b: &RigidBody, r_a: Vec2, r_b: Vec2) -> Vec2 {
    let vel_a = a.linear_velocity + math::cross_sv(a.angular_velocity, r_a);
    let vel_b = b.linear_velocity + math::cross_sv(b.angular_velocity, r_b);
    vel_b - vel_a
}

#[inline]
fn apply_pair_impulse(a: &mut RigidBody, b: &mut RigidBody, impulse: Vec2, point: Vec2) {
    a.apply_impulse(-impulse, point);
    b.apply_impulse(impulse, point);
}

/// Iterative impulse resolver with warm starting and positional correction.
#[derive(Debug, Clone, Default)]
pub struct ImpulseSolver {
    config: SolverConfig,
}

impl ImpulseSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Resolve `manifolds` in place.
    ///
    /// Applies the accumulated impulses already stored on each contact (warm
    /// start), runs `iterations` passes of normal and friction impulses,
    /// then pushes overlapping bodies apart. Final accumulated impulses are
    /// written back into the manifolds. Manifolds between two bodies with
    /// zero inverse mass are left untouched.
    ///
    /// Velocities are resolved instantaneously and positional correction is
    /// a fixed fraction per call, so the step length `_dt` does not enter.
    pub fn resolve(
        &self,
        world: &mut hecs::World,
        manifolds: &mut [ContactManifold],
        iterations: u32,
        _dt: f32,
    ) {
        let mut buffer = BodyBuffer::new();
        let mut constraints = Vec::with_capacity(manifolds.len());
        let resting_speed = self.config.restitution_threshold.max(0.0);

        // Pre-step
        for (index, manifold) in manifolds.iter_mut().enumerate() {
            let (Some(slot_a), Some(slot_b)) = (
                buffer.slot(world, manifold.entity_a()),
                buffer.slot(world, manifold.entity_b()),
            ) else {
                trace!(bodies = ?manifold.bodies, "skipping manifold with missing body");
                continue;
            };
            if slot_a == slot_b {
                continue;
            }

            let (a, b) = buffer.pair_mut(slot_a, slot_b);
            if !a.has_finite_mass() && !b.has_finite_mass() {
                for contact in &mut manifold.contacts {
                    contact.normal_impulse = 0.0;
                    contact.tangent_impulse = 0.0;
                }
                continue;
            }
            let (a, b) = (&*a, &*b);

            let normal = manifold.normal;
            let tangent = manifold.tangent();
            let restitution = (a.restitution + b.restitution) * 0.5;
            let friction = (a.friction + b.friction) * 0.5;

            let contacts = manifold
                .contacts
                .iter()
                .map(|contact| {
                    let point = contact.position;
                    let r_a = point - a.center_of_mass();
                    let r_b = point - b.center_of_mass();
                    let approach = -math::dot(relative_velocity(a, b, r_a, r_b), normal);
                    let velocity_bias = if approach > resting_speed {
                        restitution * approach
                    } else {
                        0.0
                    };
                    let (normal_impulse, tangent_impulse) = if self.config.warm_starting {
                        (contact.normal_impulse, contact.tangent_impulse)
                    } else {
                        (0.0, 0.0)
                    };
                    ContactConstraint {
                        point,
                        r_a,
                        r_b,
                        normal_mass: effective_mass(a, b, r_a, r_b, normal),
                        tangent_mass: effective_mass(a, b, r_a, r_b, tangent),
                        velocity_bias,
                        normal_impulse,
                        tangent_impulse,
                    }
                })
                .collect();

            constraints.push(ManifoldConstraint {
                index,
                slot_a,
                slot_b,
                normal,
                tangent,
                friction,
                depth: manifold.depth,
                contacts,
            });
        }

        // Warm start
        for constraint in &constraints {
            let (a, b) = buffer.pair_mut(constraint.slot_a, constraint.slot_b);
            for contact in &constraint.contacts {
                let impulse = constraint.normal * contact.normal_impulse
                    + constraint.tangent * contact.tangent_impulse;
                if impulse != Vec2::ZERO {
                    apply_pair_impulse(a, b, impulse, contact.point);
                }
            }
        }

        // Velocity iterations
        for _ in 0..iterations {
            for constraint in &mut constraints {
                let (a, b) = buffer.pair_mut(constraint.slot_a, constraint.slot_b);
                let normal = constraint.normal;
                let tangent = constraint.tangent;

                for contact in &mut constraint.contacts {
                    // Normal impulse; bodies only push.
                    let dv = relative_velocity(a, b, contact.r_a, contact.r_b);
                    let vn = math::dot(dv, normal);
                    let lambda = contact.normal_mass * (-vn + contact.velocity_bias);
                    let old_impulse = contact.normal_impulse;
                    contact.normal_impulse = (old_impulse + lambda).max(0.0);
                    let lambda = contact.normal_impulse - old_impulse;
                    apply_pair_impulse(a, b, normal * lambda, contact.point);

                    // Friction impulse inside the Coulomb cone.
                    let dv = relative_velocity(a, b, contact.r_a, contact.r_b);
                    let vt = math::dot(dv, tangent);
                    let lambda = contact.tangent_mass * -vt;
                    let max_friction = constraint.friction * contact.normal_impulse;
                    let old_impulse = contact.tangent_impulse;
                    contact.tangent_impulse =
                        math::clamp(old_impulse + lambda, -max_friction, max_friction)
                            .unwrap_or(0.0);
                    let lambda = contact.tangent_impulse - old_impulse;
                    apply_pair_impulse(a, b, tangent * lambda, contact.point);
                }
            }
        }

        // Positional correction
        for constraint in &constraints {
            let (a, b) = buffer.pair_mut(constraint.slot_a, constraint.slot_b);
            let inv_mass_sum = a.inv_mass() + b.inv_mass();
            if inv_mass_sum <= 0.0 {
                continue;
            }
            let excess = (constraint.depth - self.config.penetration_slop).max(0.0);
            let correction =
                constraint.normal * (excess / inv_mass_sum * self.config.position_correction);
            let (inv_a, inv_b) = (a.inv_mass(), b.inv_mass());
            a.apply_positional_correction(-correction * inv_a);
            b.apply_positional_correction(correction * inv_b);
        }

        for constraint in &constraints {
            let manifold = &mut manifolds[constraint.index];
            for (contact, solved) in manifold.contacts.iter_mut().zip(&constraint.contacts) {
                contact.normal_impulse = solved.normal_impulse;
                contact.tangent_impulse = solved.tangent_impulse;
            }
        }

        buffer.commit(world);
    }
}
