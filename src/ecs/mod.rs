//! Entity Component System integration with hecs.
//!
//! Bodies live in a [`hecs::World`]; an entity's identity is the body's
//! identity, and its [`RigidBody`](components::RigidBody) and
//! [`Collider`](components::Collider) components carry its state and shape.

pub mod components;

pub mod prelude {
    pub use super::components::*;
}
