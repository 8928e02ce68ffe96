//! ECS components (physics).

pub mod physics;

pub use physics::*;
