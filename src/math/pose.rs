use glam::Vec2;

/// Position and orientation of a body in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    /// Orientation in radians, counter-clockwise.
    pub angle: f32,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        angle: 0.0,
    };

    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
        }
    }

    /// Unit rotor `(cos, sin)` for this pose's angle.
    #[inline]
    pub fn rotor(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Rotate a local-space direction into world space.
    #[inline]
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        self.rotor().rotate(v)
    }

    /// Rotate a world-space direction into local space.
    #[inline]
    pub fn inverse_rotate(&self, v: Vec2) -> Vec2 {
        let r = self.rotor();
        Vec2::new(r.x, -r.y).rotate(v)
    }

    /// Map a local-space point to world space.
    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        self.rotate(p) + self.position
    }

    /// Map a world-space point to local space.
    #[inline]
    pub fn inverse_transform_point(&self, p: Vec2) -> Vec2 {
        self.inverse_rotate(p - self.position)
    }
}
