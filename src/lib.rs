//! Rein 2D contact engine
//!
//! Narrowphase contact generation and sequential impulse resolution for 2D
//! rigid bodies stored in a [`hecs::World`].
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **math** - `Vec2` helpers, clamping, and the body [`Pose`]
//! 2. **util** - unordered [`Pair`] keys for per-pair state
//! 3. **ecs** - `RigidBody` and `Collider` components
//! 4. **physics** - shapes, narrowphase, contact cache, solver, and the
//!    fixed-step [`PhysicsWorld`]
//!
//! # Example
//!
//! ```
//! use rein2d::glam::Vec2;
//! use rein2d::{Collider, PhysicsConfig, PhysicsWorld, RigidBody, Shape};
//!
//! let mut world = rein2d::hecs::World::new();
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default());
//!
//! world.spawn((
//!     RigidBody::new_static(),
//!     Collider::new(Shape::rectangle(Vec2::new(10.0, 0.5)).unwrap()),
//! ));
//! let ball = Shape::circle(0.5).unwrap();
//! world.spawn((
//!     RigidBody::from_shape(&ball, 1.0).unwrap().with_position(Vec2::new(0.0, 3.0)),
//!     Collider::new(ball),
//! ));
//!
//! for _ in 0..120 {
//!     physics.step(&mut world, 1.0 / 60.0);
//! }
//! ```

pub mod ecs;
pub mod math;
pub mod physics;
pub mod util;

// Re-export commonly used types
pub use ecs::prelude::*;

pub use math::{MathError, Pose};

pub use physics::contact::{ContactManifold, ContactPoint};
pub use physics::shape::{Polygon, Shape, ShapeError};
pub use physics::{PhysicsConfig, PhysicsWorld};

pub use util::Pair;

// Re-export glam and hecs for convenience
pub use glam;
pub use hecs;
