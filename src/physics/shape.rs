//! Collision shapes and their geometric queries.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use thiserror::Error;

use crate::math::{self, Pose};

/// Minimum edge length and turn magnitude accepted for polygon vertices.
const GEOMETRY_EPSILON: f32 = 1.0e-6;

/// Errors raised when a shape is constructed from invalid geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("polygon needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },
    #[error("polygon vertex {index} is not finite")]
    NonFiniteVertex { index: usize },
    #[error("polygon edge starting at vertex {index} has zero length")]
    DegenerateEdge { index: usize },
    #[error("polygon is not strictly convex and counter-clockwise at vertex {index}")]
    NotConvex { index: usize },
    #[error("polygon winds around more than once (self-intersecting)")]
    SelfIntersecting,
    #[error("radius must be finite and positive, got {0}")]
    InvalidRadius(f32),
    #[error("density must be finite and positive, got {0}")]
    InvalidDensity(f32),
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Test whether two AABBs overlap (touching counts).
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Mass and moment of inertia (about the shape's local origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    pub mass: f32,
    pub inertia: f32,
}

/// Convex polygon with counter-clockwise local-space vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    /// Outward unit normal of the edge `vertices[i] -> vertices[i + 1]`.
    normals: Vec<Vec2>,
}

impl Polygon {
    /// Build a polygon, validating that the hull is convex, counter-clockwise
    /// and simple.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        let count = vertices.len();
        if count < 3 {
            return Err(ShapeError::TooFewVertices { count });
        }
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(ShapeError::NonFiniteVertex { index });
        }

        let edges: Vec<Vec2> = (0..count)
            .map(|i| vertices[(i + 1) % count] - vertices[i])
            .collect();

        let mut normals = Vec::with_capacity(count);
        for (index, edge) in edges.iter().enumerate() {
            let tangent =
                math::normalize(*edge).map_err(|_| ShapeError::DegenerateEdge { index })?;
            normals.push(Vec2::new(tangent.y, -tangent.x));
        }

        let mut winding = 0.0;
        for i in 0..count {
            let e0 = edges[i];
            let e1 = edges[(i + 1) % count];
            let turn = math::cross(e0, e1);
            if turn <= GEOMETRY_EPSILON * e0.length() * e1.length() {
                return Err(ShapeError::NotConvex {
                    index: (i + 1) % count,
                });
            }
            winding += turn.atan2(math::dot(e0, e1));
        }
        // A simple convex hull turns exactly once; a star turns twice or more.
        if winding > TAU + PI * 0.5 {
            return Err(ShapeError::SelfIntersecting);
        }

        Ok(Self { vertices, normals })
    }

    /// Axis-aligned box centered on the origin.
    pub fn rectangle(half_extents: Vec2) -> Result<Self, ShapeError> {
        let Vec2 { x, y } = half_extents;
        Self::new(vec![
            Vec2::new(-x, -y),
            Vec2::new(x, -y),
            Vec2::new(x, y),
            Vec2::new(-x, y),
        ])
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    pub fn regular(radius: f32, sides: usize) -> Result<Self, ShapeError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        let vertices = (0..sides)
            .map(|i| Vec2::from_angle(TAU * i as f32 / sides as f32) * radius)
            .collect();
        Self::new(vertices)
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    #[inline]
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false; a valid polygon has at least three vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn world_vertices(&self, pose: &Pose) -> Vec<Vec2> {
        self.vertices
            .iter()
            .map(|v| pose.transform_point(*v))
            .collect()
    }

    pub fn world_normals(&self, pose: &Pose) -> Vec<Vec2> {
        self.normals.iter().map(|n| pose.rotate(*n)).collect()
    }

    /// Farthest world-space vertex along `direction`.
    pub fn support(&self, direction: Vec2, pose: &Pose) -> Vec2 {
        let local_dir = pose.inverse_rotate(direction);
        let mut best = self.vertices[0];
        let mut best_dot = best.dot(local_dir);
        for v in &self.vertices[1..] {
            let d = v.dot(local_dir);
            if d > best_dot {
                best_dot = d;
                best = *v;
            }
        }
        pose.transform_point(best)
    }

    /// Project the world-space polygon onto a unit `axis`, returning `(min, max)`.
    pub fn project(&self, axis: Vec2, pose: &Pose) -> (f32, f32) {
        self.vertices
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                let d = math::dot(pose.transform_point(*v), axis);
                (lo.min(d), hi.max(d))
            })
    }

    /// Signed area and inertia-per-unit-density about the origin.
    fn integrate(&self) -> (f32, f32) {
        const INV3: f32 = 1.0 / 3.0;
        let mut area = 0.0;
        let mut inertia = 0.0;
        let count = self.vertices.len();
        for i in 0..count {
            let e1 = self.vertices[i];
            let e2 = self.vertices[(i + 1) % count];
            let d = math::cross(e1, e2);
            area += 0.5 * d;
            let intx2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
            let inty2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
            inertia += (0.25 * INV3 * d) * (intx2 + inty2);
        }
        (area, inertia)
    }
}

/// Geometric primitive attached to a body.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Polygon(Polygon),
}

impl Shape {
    pub fn circle(radius: f32) -> Result<Self, ShapeError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        Ok(Shape::Circle { radius })
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        Polygon::new(vertices).map(Shape::Polygon)
    }

    pub fn rectangle(half_extents: Vec2) -> Result<Self, ShapeError> {
        Polygon::rectangle(half_extents).map(Shape::Polygon)
    }

    /// Support point: the farthest world-space point along `direction`.
    pub fn support(&self, direction: Vec2, pose: &Pose) -> Vec2 {
        match self {
            Shape::Circle { radius } => match math::normalize(direction) {
                Ok(dir) => pose.position + dir * *radius,
                Err(_) => pose.position,
            },
            Shape::Polygon(polygon) => polygon.support(direction, pose),
        }
    }

    /// Project the shape onto a unit `axis`, returning `(min, max)`.
    pub fn project(&self, axis: Vec2, pose: &Pose) -> (f32, f32) {
        match self {
            Shape::Circle { radius } => {
                let c = math::dot(pose.position, axis);
                (c - radius, c + radius)
            }
            Shape::Polygon(polygon) => polygon.project(axis, pose),
        }
    }

    /// Compute the world-space AABB for this shape.
    pub fn compute_aabb(&self, pose: &Pose) -> Aabb {
        match self {
            Shape::Circle { radius } => Aabb {
                min: pose.position - Vec2::splat(*radius),
                max: pose.position + Vec2::splat(*radius),
            },
            Shape::Polygon(polygon) => {
                let mut min = Vec2::splat(f32::MAX);
                let mut max = Vec2::splat(f32::MIN);
                for v in &polygon.vertices {
                    let wp = pose.transform_point(*v);
                    min = min.min(wp);
                    max = max.max(wp);
                }
                Aabb { min, max }
            }
        }
    }

    /// Mass and rotational inertia about the local origin for a uniform density.
    pub fn mass_properties(&self, density: f32) -> Result<MassProperties, ShapeError> {
        if !density.is_finite() || density <= 0.0 {
            return Err(ShapeError::InvalidDensity(density));
        }
        Ok(match self {
            Shape::Circle { radius } => {
                let mass = density * PI * radius * radius;
                MassProperties {
                    mass,
                    inertia: 0.5 * mass * radius * radius,
                }
            }
            Shape::Polygon(polygon) => {
                let (area, inertia) = polygon.integrate();
                MassProperties {
                    mass: density * area,
                    inertia: density * inertia,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::rectangle(Vec2::splat(0.5)).unwrap()
    }

    #[test]
    fn test_polygon_too_few_vertices() {
        let err = Polygon::new(vec![Vec2::ZERO, Vec2::X]).unwrap_err();
        assert_eq!(err, ShapeError::TooFewVertices { count: 2 });
    }

    #[test]
    fn test_polygon_clockwise_rejected() {
        let cw = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ];
        assert!(matches!(
            Polygon::new(cw),
            Err(ShapeError::NotConvex { .. })
        ));
    }

    #[test]
    fn test_polygon_concave_rejected() {
        let dart = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.5),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        assert!(matches!(
            Polygon::new(dart),
            Err(ShapeError::NotConvex { .. })
        ));
    }

    #[test]
    fn test_polygon_collinear_and_duplicate_rejected() {
        let collinear = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 1.0),
        ];
        assert!(matches!(
            Polygon::new(collinear),
            Err(ShapeError::NotConvex { index: 1 })
        ));

        let duplicate = vec![Vec2::ZERO, Vec2::ZERO, Vec2::X, Vec2::Y];
        assert_eq!(
            Polygon::new(duplicate),
            Err(ShapeError::DegenerateEdge { index: 0 })
        );
    }

    #[test]
    fn test_polygon_pentagram_rejected() {
        // Every turn is a left turn, but the outline winds around twice.
        let star = (0..5)
            .map(|i| Vec2::from_angle(TAU * (2 * i) as f32 / 5.0))
            .collect();
        assert_eq!(Polygon::new(star), Err(ShapeError::SelfIntersecting));
    }

    #[test]
    fn test_polygon_non_finite_rejected() {
        let bad = vec![Vec2::ZERO, Vec2::new(f32::NAN, 0.0), Vec2::Y];
        assert_eq!(
            Polygon::new(bad),
            Err(ShapeError::NonFiniteVertex { index: 1 })
        );
    }

    #[test]
    fn test_rectangle_normals() {
        let poly = square();
        assert_eq!(poly.len(), 4);
        let expected = [Vec2::NEG_Y, Vec2::X, Vec2::Y, Vec2::NEG_X];
        for (n, e) in poly.normals().iter().zip(expected) {
            assert!((*n - e).length() < 1e-6);
        }
    }

    #[test]
    fn test_regular_polygon() {
        let hex = Polygon::regular(1.0, 6).unwrap();
        assert_eq!(hex.len(), 6);
        // Vertices on the unit circle.
        assert!(hex.vertices().iter().all(|v| (v.length() - 1.0).abs() < 1e-5));
        assert!(Polygon::regular(1.0, 2).is_err());
        assert!(Polygon::regular(-1.0, 5).is_err());
    }

    #[test]
    fn test_circle_validation() {
        assert!(Shape::circle(1.0).is_ok());
        assert_eq!(Shape::circle(0.0), Err(ShapeError::InvalidRadius(0.0)));
        assert!(Shape::circle(f32::NAN).is_err());
    }

    #[test]
    fn test_sphere_aabb() {
        let shape = Shape::circle(1.0).unwrap();
        let aabb = shape.compute_aabb(&Pose::from_position(Vec2::new(0.0, 5.0)));
        assert_eq!(aabb.min, Vec2::new(-1.0, 4.0));
        assert_eq!(aabb.max, Vec2::new(1.0, 6.0));
    }

    #[test]
    fn test_rotated_box_aabb() {
        let shape = Shape::rectangle(Vec2::splat(1.0)).unwrap();
        let aabb = shape.compute_aabb(&Pose::new(Vec2::ZERO, std::f32::consts::FRAC_PI_4));
        let r = 2.0f32.sqrt();
        assert!((aabb.max - Vec2::splat(r)).length() < 1e-5);
        assert!((aabb.min + Vec2::splat(r)).length() < 1e-5);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb {
            min: Vec2::splat(-1.0),
            max: Vec2::splat(1.0),
        };
        let b = Aabb {
            min: Vec2::splat(0.5),
            max: Vec2::splat(2.0),
        };
        let c = Aabb {
            min: Vec2::new(2.5, 0.0),
            max: Vec2::new(3.0, 1.0),
        };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_support_and_projection() {
        let shape = Shape::Polygon(square());
        let pose = Pose::from_position(Vec2::new(2.0, 0.0));
        assert_eq!(shape.support(Vec2::new(1.0, 1.0), &pose), Vec2::new(2.5, 0.5));
        let (lo, hi) = shape.project(Vec2::X, &pose);
        assert!((lo - 1.5).abs() < 1e-6 && (hi - 2.5).abs() < 1e-6);

        let circle = Shape::circle(2.0).unwrap();
        let support = circle.support(Vec2::Y, &Pose::from_position(Vec2::new(0.0, 5.0)));
        assert_eq!(support, Vec2::new(0.0, 7.0));
        // Degenerate direction falls back to the center.
        assert_eq!(circle.support(Vec2::ZERO, &Pose::IDENTITY), Vec2::ZERO);
    }

    #[test]
    fn test_mass_properties() {
        let props = Shape::Polygon(square()).mass_properties(1.0).unwrap();
        assert!((props.mass - 1.0).abs() < 1e-6);
        assert!((props.inertia - 1.0 / 6.0).abs() < 1e-6);

        let props = Shape::circle(2.0).unwrap().mass_properties(0.5).unwrap();
        assert!((props.mass - 2.0 * PI).abs() < 1e-5);
        assert!((props.inertia - 4.0 * PI).abs() < 1e-4);

        assert_eq!(
            Shape::circle(1.0).unwrap().mass_properties(-1.0),
            Err(ShapeError::InvalidDensity(-1.0))
        );
    }
}
