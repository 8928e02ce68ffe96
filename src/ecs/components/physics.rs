//! Physics components for ECS entities.

use glam::Vec2;

use crate::math::{self, Pose};
use crate::physics::shape::{ShapeError, Shape};

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by forces and collisions.
    Dynamic,
    /// Immovable.
    Static,
    /// Moved by its velocity only; pushes dynamic bodies but is never pushed.
    Kinematic,
}

/// Rigid body component.
///
/// The body's origin (`position`) is its center of mass. Static and
/// kinematic bodies have zero inverse mass and inertia and never receive
/// impulses or positional correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub body_type: RigidBodyType,
    pub position: Vec2,
    /// Orientation in radians.
    pub angle: f32,
    pub linear_velocity: Vec2,
    /// Angular velocity in radians per second (counter-clockwise positive).
    pub angular_velocity: f32,
    mass: f32,
    inv_mass: f32,
    inertia: f32,
    inv_inertia: f32,
    /// Coefficient of restitution (0.0 - 1.0).
    pub restitution: f32,
    /// Friction coefficient (>= 0.0).
    pub friction: f32,
    pub force_accumulator: Vec2,
    pub torque_accumulator: f32,
    /// Linear damping factor (default: 0.0).
    pub linear_damping: f32,
    /// Angular damping factor (default: 0.0).
    pub angular_damping: f32,
    /// Gravity scale (default: 1.0).
    pub gravity_scale: f32,
}

impl RigidBody {
    fn with_type(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            restitution: 0.3,
            friction: 0.5,
            force_accumulator: Vec2::ZERO,
            torque_accumulator: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 0.0,
        }
    }

    /// Create a new dynamic rigid body with the given mass and moment of inertia.
    ///
    /// A non-positive inertia locks rotation (zero inverse inertia).
    pub fn new_dynamic(mass: f32, inertia: f32) -> Self {
        let mut body = Self::with_type(RigidBodyType::Dynamic);
        body.gravity_scale = 1.0;
        body.set_mass_properties(mass, inertia);
        body
    }

    /// Create a new static rigid body.
    pub fn new_static() -> Self {
        Self::with_type(RigidBodyType::Static)
    }

    /// Create a new kinematic rigid body.
    pub fn new_kinematic() -> Self {
        Self::with_type(RigidBodyType::Kinematic)
    }

    /// Create a dynamic body whose mass and inertia come from `shape` at the given density.
    pub fn from_shape(shape: &Shape, density: f32) -> Result<Self, ShapeError> {
        let props = shape.mass_properties(density)?;
        Ok(Self::new_dynamic(props.mass, props.inertia))
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, velocity: f32) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Set restitution (clamped into `[0, 1]`) and friction (floored at 0).
    pub fn with_material(mut self, restitution: f32, friction: f32) -> Self {
        self.restitution = if restitution.is_nan() {
            0.0
        } else {
            restitution.clamp(0.0, 1.0)
        };
        self.friction = if friction.is_nan() { 0.0 } else { friction.max(0.0) };
        self
    }

    /// Set mass and inertia.
    ///
    /// Only dynamic bodies with a finite, positive mass become movable. In
    /// every other case both inverses are zero, so the body takes neither
    /// linear nor angular impulses. A non-positive inertia on a movable body
    /// only locks rotation.
    pub fn set_mass_properties(&mut self, mass: f32, inertia: f32) {
        let movable =
            self.body_type == RigidBodyType::Dynamic && mass.is_finite() && mass > 0.0;
        if movable {
            self.mass = mass;
            self.inv_mass = 1.0 / mass;
        } else {
            self.mass = 0.0;
            self.inv_mass = 0.0;
        }
        if movable && inertia.is_finite() && inertia > 0.0 {
            self.inertia = inertia;
            self.inv_inertia = 1.0 / inertia;
        } else {
            self.inertia = 0.0;
            self.inv_inertia = 0.0;
        }
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    #[inline]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    #[inline]
    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }

    /// Whether impulses can change this body's motion at all.
    #[inline]
    pub fn has_finite_mass(&self) -> bool {
        self.inv_mass != 0.0 || self.inv_inertia != 0.0
    }

    #[inline]
    pub fn center_of_mass(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.angle)
    }

    /// Velocity of the material point at world position `point`.
    #[inline]
    pub fn velocity_at(&self, point: Vec2) -> Vec2 {
        self.linear_velocity
            + math::cross_sv(self.angular_velocity, point - self.center_of_mass())
    }

    /// Apply an impulse at a world-space contact point.
    pub fn apply_impulse(&mut self, impulse: Vec2, contact_point: Vec2) {
        if !self.has_finite_mass() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity +=
            self.inv_inertia * math::cross(contact_point - self.center_of_mass(), impulse);
    }

    /// Nudge the position directly, bypassing velocity.
    pub fn apply_positional_correction(&mut self, delta: Vec2) {
        if !self.has_finite_mass() {
            return;
        }
        self.position += delta;
    }
}

/// Collision shape attached to a body.
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: Shape,
}

impl Collider {
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }
}
