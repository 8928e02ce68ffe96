//! Contact data structures for collision response.

use glam::Vec2;

use crate::util::Pair;

/// Maximum number of contact points in a 2D manifold.
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// Contact geometry between two shapes, as produced by the narrowphase.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactInfo {
    /// Unit contact normal (from shape A to shape B).
    pub normal: Vec2,
    /// Penetration depth along the normal (least-overlap distance).
    pub penetration: f32,
    /// World-space contact points with their individual penetration depths.
    pub points: Vec<(Vec2, f32)>,
}

/// A single contact point with accumulated impulse data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact position in world space.
    pub position: Vec2,
    /// Penetration depth at this point.
    pub penetration: f32,
    /// Accumulated normal impulse.
    pub normal_impulse: f32,
    /// Accumulated tangent (friction) impulse.
    pub tangent_impulse: f32,
}

impl ContactPoint {
    pub fn new(position: Vec2, penetration: f32) -> Self {
        Self {
            position,
            penetration,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
        }
    }
}

/// Contact record between two bodies for one step.
///
/// `bodies` only names the two entities; the manifold never owns them.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    pub bodies: Pair<hecs::Entity>,
    /// Unit contact normal (from `bodies.first()` to `bodies.second()`).
    pub normal: Vec2,
    /// Non-negative penetration depth.
    pub depth: f32,
    pub contacts: Vec<ContactPoint>,
}

impl ContactManifold {
    pub fn new(entity_a: hecs::Entity, entity_b: hecs::Entity, info: ContactInfo) -> Self {
        Self {
            bodies: Pair::new(entity_a, entity_b),
            normal: info.normal,
            depth: info.penetration.max(0.0),
            contacts: info
                .points
                .into_iter()
                .take(MAX_MANIFOLD_POINTS)
                .map(|(position, penetration)| ContactPoint::new(position, penetration))
                .collect(),
        }
    }

    #[inline]
    pub fn entity_a(&self) -> hecs::Entity {
        *self.bodies.first()
    }

    #[inline]
    pub fn entity_b(&self) -> hecs::Entity {
        *self.bodies.second()
    }

    /// Unit tangent, the normal rotated a quarter turn clockwise.
    #[inline]
    pub fn tangent(&self) -> Vec2 {
        Vec2::new(self.normal.y, -self.normal.x)
    }
}
