//! Broadphase collision detection using AABB overlap tests.

use crate::ecs::components::physics::{Collider, RigidBody};

use super::shape::Aabb;

/// Sweep-and-prune broadphase along the x axis.
#[derive(Debug, Default)]
pub struct SweepAndPrune {
    entries: Vec<(hecs::Entity, Aabb, bool)>,
}

impl SweepAndPrune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find all pairs of entities whose AABBs overlap.
    ///
    /// Only returns pairs where at least one body can be moved by impulses.
    /// Pairs come out ordered by the lower x bound of their first entity, so
    /// the result is deterministic for a given world.
    pub fn find_pairs(&mut self, world: &hecs::World) -> Vec<(hecs::Entity, hecs::Entity)> {
        self.entries.clear();
        for (entity, (collider, rb)) in world.query::<(&Collider, &RigidBody)>().iter() {
            let aabb = collider.shape.compute_aabb(&rb.pose());
            self.entries.push((entity, aabb, rb.has_finite_mass()));
        }

        self.entries.sort_by(|(ea, a, _), (eb, b, _)| {
            a.min
                .x
                .total_cmp(&b.min.x)
                .then_with(|| ea.to_bits().cmp(&eb.to_bits()))
        });

        let mut pairs = Vec::new();
        for i in 0..self.entries.len() {
            let (entity_a, aabb_a, movable_a) = &self.entries[i];
            for (entity_b, aabb_b, movable_b) in &self.entries[i + 1..] {
                // Sorted by min.x: nothing further along can overlap.
                if aabb_b.min.x > aabb_a.max.x {
                    break;
                }
                if !movable_a && !movable_b {
                    continue;
                }
                if aabb_a.overlaps(aabb_b) {
                    pairs.push((*entity_a, *entity_b));
                }
            }
        }

        pairs
    }
}
