//! Small generic helpers shared across the engine.

pub mod pair;

pub use pair::Pair;
