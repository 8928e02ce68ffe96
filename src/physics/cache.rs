//! Persistent contact state between steps, used for warm starting.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::math;
use crate::util::Pair;

use super::contact::ContactManifold;

/// Contacts closer than this to a cached contact inherit its impulses.
pub const WARM_START_MATCH_DISTANCE: f32 = 0.05;
/// Minimum dot product between the cached and current normal for reuse.
pub const WARM_START_NORMAL_DOT: f32 = 0.95;

/// Last step's manifold for every pair still in contact.
#[derive(Debug, Default)]
pub struct ContactCache {
    manifolds: HashMap<Pair<hecs::Entity>, ContactManifold>,
}

impl ContactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed accumulated impulses on fresh manifolds from the cached ones.
    ///
    /// Contacts are matched by position; a contact with no cached neighbour
    /// within [`WARM_START_MATCH_DISTANCE`], or whose normal has turned too
    /// far, starts from zero.
    pub fn warm_start(&self, manifolds: &mut [ContactManifold]) {
        for manifold in manifolds.iter_mut() {
            let Some(cached) = self.manifolds.get(&manifold.bodies) else {
                continue;
            };

            // A pair cached in the opposite order has its normal and tangent flipped.
            let reversed = cached.entity_a() != manifold.entity_a();
            let (cached_normal, tangent_sign) = if reversed {
                (-cached.normal, -1.0)
            } else {
                (cached.normal, 1.0)
            };
            if math::dot(cached_normal, manifold.normal) <= WARM_START_NORMAL_DOT {
                continue;
            }

            let max_sqrd = WARM_START_MATCH_DISTANCE * WARM_START_MATCH_DISTANCE;
            for contact in &mut manifold.contacts {
                let nearest = cached
                    .contacts
                    .iter()
                    .map(|old| (math::distance_sqrd(old.position, contact.position), old))
                    .filter(|(d, _)| *d <= max_sqrd)
                    .min_by(|(a, _), (b, _)| a.total_cmp(b));
                if let Some((_, old)) = nearest {
                    contact.normal_impulse = old.normal_impulse;
                    contact.tangent_impulse = old.tangent_impulse * tangent_sign;
                }
            }
        }
    }

    /// Replace the cache with this step's manifolds.
    ///
    /// Pairs seen for the first time are inserted, pairs still touching are
    /// overwritten and pairs that stopped touching are evicted.
    pub fn update(&mut self, manifolds: &[ContactManifold]) {
        let current: HashSet<Pair<hecs::Entity>> = manifolds.iter().map(|m| m.bodies).collect();

        let before = self.manifolds.len();
        self.manifolds.retain(|pair, _| current.contains(pair));
        let evicted = before - self.manifolds.len();

        let mut inserted = 0;
        for manifold in manifolds {
            if self
                .manifolds
                .insert(manifold.bodies, manifold.clone())
                .is_none()
            {
                inserted += 1;
            }
        }

        if evicted > 0 || inserted > 0 {
            trace!(inserted, evicted, cached = self.manifolds.len(), "contact cache updated");
        }
    }

    /// Evict every pair involving `entity`.
    pub fn remove_body(&mut self, entity: hecs::Entity) {
        let before = self.manifolds.len();
        self.manifolds.retain(|pair, _| !pair.contains(&entity));
        let evicted = before - self.manifolds.len();
        if evicted > 0 {
            trace!(?entity, evicted, "evicted contacts of removed body");
        }
    }

    pub fn get(&self, pair: &Pair<hecs::Entity>) -> Option<&ContactManifold> {
        self.manifolds.get(pair)
    }

    pub fn len(&self) -> usize {
        self.manifolds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifolds.is_empty()
    }

    pub fn clear(&mut self) {
        self.manifolds.clear();
    }
}
