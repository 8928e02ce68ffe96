//! Narrowphase collision detection: separating-axis tests with face clipping.
//!
//! Every test reports the contact normal pointing from the first shape to the
//! second and the least-overlap penetration along it. Touching shapes (zero
//! overlap) count as separated.

use glam::Vec2;
use tracing::{trace, warn};

use crate::ecs::components::physics::{Collider, RigidBody};
use crate::math::{self, Pose};

use super::contact::{ContactInfo, ContactManifold};
use super::shape::{Polygon, Shape};

/// A later axis must beat the current best by more than this to replace it,
/// so near-equal overlaps keep the axis of the first shape evaluated.
pub const AXIS_TIE_TOLERANCE: f32 = 1.0e-4;

/// Normal used when two circle centers coincide.
const CONCENTRIC_NORMAL: Vec2 = Vec2::Y;

/// Running least-overlap selection over candidate axes.
#[derive(Debug, Clone, Copy)]
struct LeastOverlap<F> {
    best: Option<(f32, F)>,
}

impl<F: Copy> LeastOverlap<F> {
    fn new() -> Self {
        Self { best: None }
    }

    fn offer(&mut self, overlap: f32, feature: F) {
        match self.best {
            Some((best, _)) if overlap >= best - AXIS_TIE_TOLERANCE => {}
            _ => self.best = Some((overlap, feature)),
        }
    }

    fn finish(self) -> Option<(f32, F)> {
        self.best
    }
}

/// Overlap of two projected intervals and the direction (+1 or -1 along the
/// axis) in which B has to move to separate. `None` if they do not overlap.
fn interval_overlap(
    (min_a, max_a): (f32, f32),
    (min_b, max_b): (f32, f32),
) -> Option<(f32, f32)> {
    let push_forward = max_a - min_b;
    let push_back = max_b - min_a;
    if push_forward <= 0.0 || push_back <= 0.0 {
        return None;
    }
    if push_forward <= push_back {
        Some((push_forward, 1.0))
    } else {
        Some((push_back, -1.0))
    }
}

/// Specialized circle-circle intersection test.
pub fn circle_circle(
    radius_a: f32,
    pose_a: &Pose,
    radius_b: f32,
    pose_b: &Pose,
) -> Option<ContactInfo> {
    let center_a = pose_a.position;
    let center_b = pose_b.position;
    let min_dist = radius_a + radius_b;

    let dist_sq = math::distance_sqrd(center_a, center_b);
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let (normal, penetration) = match math::normalize(center_b - center_a) {
        Ok(normal) => (normal, min_dist - dist_sq.sqrt()),
        Err(_) => (CONCENTRIC_NORMAL, min_dist),
    };
    let point = center_a + normal * radius_a;

    Some(ContactInfo {
        normal,
        penetration,
        points: vec![(point, penetration)],
    })
}

/// SAT test between a circle and a convex polygon.
///
/// `circle_first` says whether the circle is shape A; its axes are then
/// evaluated before the polygon's and the normal points away from it.
pub fn circle_polygon(
    radius: f32,
    circle_pose: &Pose,
    polygon: &Polygon,
    polygon_pose: &Pose,
    circle_first: bool,
) -> Option<ContactInfo> {
    let center = circle_pose.position;
    let vertices = polygon.world_vertices(polygon_pose);
    let normals = polygon.world_normals(polygon_pose);

    // Axis from the circle center toward the polygon's nearest vertex.
    let mut nearest = vertices[0];
    let mut nearest_dist = math::distance_sqrd(center, nearest);
    for v in &vertices[1..] {
        let d = math::distance_sqrd(center, *v);
        if d < nearest_dist {
            nearest_dist = d;
            nearest = *v;
        }
    }
    let vertex_axis = math::normalize(nearest - center).ok();

    let mut axes = Vec::with_capacity(normals.len() + 1);
    if circle_first {
        axes.extend(vertex_axis);
        axes.extend_from_slice(&normals);
    } else {
        axes.extend_from_slice(&normals);
        axes.extend(vertex_axis);
    }

    let mut least = LeastOverlap::new();
    for axis in axes {
        let c = math::dot(center, axis);
        let circle_interval = (c - radius, c + radius);
        let polygon_interval = polygon.project(axis, polygon_pose);
        let (a, b) = if circle_first {
            (circle_interval, polygon_interval)
        } else {
            (polygon_interval, circle_interval)
        };
        let (overlap, direction) = interval_overlap(a, b)?;
        least.offer(overlap, axis * direction);
    }

    let (penetration, normal) = least.finish()?;
    let point = if circle_first {
        center + normal * radius
    } else {
        center - normal * radius
    };

    Some(ContactInfo {
        normal,
        penetration,
        points: vec![(point, penetration)],
    })
}

/// For each reference face, the distance `incident` penetrates past the
/// face plane (measured at its support point along the reversed normal).
/// Returns the face of least overlap, or `None` if any face separates.
fn least_face_overlap(
    ref_vertices: &[Vec2],
    ref_normals: &[Vec2],
    incident: &Polygon,
    incident_pose: &Pose,
) -> Option<(f32, usize)> {
    let mut least = LeastOverlap::new();
    for (i, (v, n)) in ref_vertices.iter().zip(ref_normals).enumerate() {
        let deepest = incident.support(-*n, incident_pose);
        let overlap = math::dot(*n, *v) - math::dot(*n, deepest);
        if overlap <= 0.0 {
            return None;
        }
        least.offer(overlap, i);
    }
    least.finish()
}

/// Clip a segment against the half-plane `dot(normal, p) <= offset`.
/// Returns the number of points left in `face`.
fn clip_segment(face: &mut [Vec2; 2], normal: Vec2, offset: f32) -> usize {
    let mut out = *face;
    let mut count = 0;

    let d0 = math::dot(normal, face[0]) - offset;
    let d1 = math::dot(normal, face[1]) - offset;

    if d0 <= 0.0 {
        out[count] = face[0];
        count += 1;
    }
    if d1 <= 0.0 {
        out[count] = face[1];
        count += 1;
    }
    // Endpoints on opposite sides: add the crossing point.
    if d0 * d1 < 0.0 && count < 2 {
        let alpha = d0 / (d0 - d1);
        out[count] = face[0] + (face[1] - face[0]) * alpha;
        count += 1;
    }

    *face = out;
    count
}

/// SAT test between two convex polygons with reference/incident face clipping.
pub fn polygon_polygon(
    polygon_a: &Polygon,
    pose_a: &Pose,
    polygon_b: &Polygon,
    pose_b: &Pose,
) -> Option<ContactInfo> {
    let vertices_a = polygon_a.world_vertices(pose_a);
    let normals_a = polygon_a.world_normals(pose_a);
    let vertices_b = polygon_b.world_vertices(pose_b);
    let normals_b = polygon_b.world_normals(pose_b);

    let (overlap_a, face_a) = least_face_overlap(&vertices_a, &normals_a, polygon_b, pose_b)?;
    let (overlap_b, face_b) = least_face_overlap(&vertices_b, &normals_b, polygon_a, pose_a)?;

    let flip = overlap_b < overlap_a - AXIS_TIE_TOLERANCE;
    let (penetration, ref_index) = if flip {
        (overlap_b, face_b)
    } else {
        (overlap_a, face_a)
    };
    let (ref_vertices, ref_normals, inc_vertices, inc_normals) = if flip {
        (&vertices_b, &normals_b, &vertices_a, &normals_a)
    } else {
        (&vertices_a, &normals_a, &vertices_b, &normals_b)
    };
    let (incident_polygon, incident_pose) = if flip {
        (polygon_a, pose_a)
    } else {
        (polygon_b, pose_b)
    };

    let ref_normal = ref_normals[ref_index];
    let v1 = ref_vertices[ref_index];
    let v2 = ref_vertices[(ref_index + 1) % ref_vertices.len()];

    // Incident face: the one most anti-parallel to the reference normal.
    let mut inc_index = 0;
    let mut min_dot = f32::MAX;
    for (i, n) in inc_normals.iter().enumerate() {
        let d = math::dot(ref_normal, *n);
        if d < min_dot {
            min_dot = d;
            inc_index = i;
        }
    }
    let mut incident = [
        inc_vertices[inc_index],
        inc_vertices[(inc_index + 1) % inc_vertices.len()],
    ];

    let ref_offset = math::dot(ref_normal, v1);
    let mut points = Vec::with_capacity(2);

    if let Ok(side) = math::normalize(v2 - v1) {
        if clip_segment(&mut incident, -side, -math::dot(side, v1)) == 2
            && clip_segment(&mut incident, side, math::dot(side, v2)) == 2
        {
            for p in incident {
                let separation = math::dot(ref_normal, p) - ref_offset;
                if separation <= 0.0 {
                    points.push((p, -separation));
                }
            }
        }
    }

    if points.is_empty() {
        // Clipping lost the points to rounding; keep the deepest incident vertex.
        let deepest = incident_polygon.support(-ref_normal, incident_pose);
        let depth = ref_offset - math::dot(ref_normal, deepest);
        points.push((deepest, depth.max(0.0)));
    }

    Some(ContactInfo {
        normal: if flip { -ref_normal } else { ref_normal },
        penetration,
        points,
    })
}

/// Detect collision between two shapes, dispatching on the pair of shape kinds.
///
/// Returns `None` when the shapes are separated. A result whose normal is not
/// unit length is discarded as well, so callers never see a degenerate normal.
pub fn compute_manifold(
    shape_a: &Shape,
    pose_a: &Pose,
    shape_b: &Shape,
    pose_b: &Pose,
) -> Option<ContactInfo> {
    let info = match (shape_a, shape_b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(*ra, pose_a, *rb, pose_b)
        }
        (Shape::Circle { radius }, Shape::Polygon(polygon)) => {
            circle_polygon(*radius, pose_a, polygon, pose_b, true)
        }
        (Shape::Polygon(polygon), Shape::Circle { radius }) => {
            circle_polygon(*radius, pose_b, polygon, pose_a, false)
        }
        (Shape::Polygon(a), Shape::Polygon(b)) => polygon_polygon(a, pose_a, b, pose_b),
    }?;

    let unit = (math::magnitude_sqrd(info.normal) - 1.0).abs() < 1.0e-3;
    if !info.normal.is_finite() || !unit || !info.penetration.is_finite() {
        warn!(
            normal = ?info.normal,
            penetration = info.penetration,
            "discarding contact with degenerate normal"
        );
        return None;
    }
    Some(info)
}

/// Run the narrowphase over externally filtered candidate pairs.
///
/// Each hit becomes a manifold keyed by the pair in the given order. Pairs
/// naming the same entity twice, or an entity without a `RigidBody` and
/// `Collider`, are skipped. Manifolds between two static bodies are still
/// produced.
pub fn detect_collisions(
    world: &hecs::World,
    pairs: &[(hecs::Entity, hecs::Entity)],
) -> Vec<ContactManifold> {
    let mut manifolds = Vec::with_capacity(pairs.len());

    for &(entity_a, entity_b) in pairs {
        if entity_a == entity_b {
            trace!(?entity_a, "skipping self pair");
            continue;
        }

        let contact = {
            let rb_a = world.get::<&RigidBody>(entity_a);
            let rb_b = world.get::<&RigidBody>(entity_b);
            let collider_a = world.get::<&Collider>(entity_a);
            let collider_b = world.get::<&Collider>(entity_b);

            if let (Ok(ra), Ok(rb), Ok(ca), Ok(cb)) = (rb_a, rb_b, collider_a, collider_b) {
                compute_manifold(&ca.shape, &ra.pose(), &cb.shape, &rb.pose())
            } else {
                trace!(?entity_a, ?entity_b, "skipping pair with missing components");
                None
            }
        };

        if let Some(info) = contact {
            manifolds.push(ContactManifold::new(entity_a, entity_b, info));
        }
    }

    manifolds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    const EPS: f32 = 1e-4;

    fn circle(r: f32) -> Shape {
        Shape::circle(r).unwrap()
    }

    fn rect(hx: f32, hy: f32) -> Shape {
        Shape::rectangle(Vec2::new(hx, hy)).unwrap()
    }

    fn at(x: f32, y: f32) -> Pose {
        Pose::from_position(Vec2::new(x, y))
    }

    #[test]
    fn test_circle_circle_intersection() {
        let result = compute_manifold(&circle(1.0), &at(0.0, 0.0), &circle(1.0), &at(1.5, 0.0));
        let info = result.unwrap();
        assert!((info.normal - Vec2::X).length() < EPS);
        assert!((info.penetration - 0.5).abs() < EPS);
        assert_eq!(info.points.len(), 1);
        assert!((info.points[0].0 - Vec2::X).length() < EPS);
    }

    #[test]
    fn test_circle_circle_no_intersection() {
        let result = compute_manifold(&circle(1.0), &at(0.0, 0.0), &circle(1.0), &at(3.0, 0.0));
        assert!(result.is_none());
        // Touching is not overlapping.
        let result = compute_manifold(&circle(1.0), &at(0.0, 0.0), &circle(1.0), &at(2.0, 0.0));
        assert!(result.is_none());
    }

    #[test]
    fn test_concentric_circles_use_fallback_normal() {
        let info =
            compute_manifold(&circle(1.0), &at(2.0, 2.0), &circle(0.5), &at(2.0, 2.0)).unwrap();
        assert_eq!(info.normal, Vec2::Y);
        assert!((info.penetration - 1.5).abs() < EPS);
    }

    #[test]
    fn test_box_box_overlap_along_x() {
        let info = compute_manifold(
            &rect(0.5, 0.5),
            &at(0.0, 0.0),
            &rect(0.5, 0.5),
            &at(0.8, 0.0),
        )
        .unwrap();
        assert!((info.normal - Vec2::X).length() < EPS);
        assert!((info.penetration - 0.2).abs() < EPS);
        assert_eq!(info.points.len(), 2);
        for (p, depth) in &info.points {
            assert!((p.x - 0.3).abs() < EPS);
            assert!((p.y.abs() - 0.5).abs() < EPS);
            assert!((depth - 0.2).abs() < EPS);
        }
    }

    #[test]
    fn test_box_box_normal_points_from_a_to_b() {
        let info = compute_manifold(
            &rect(0.5, 0.5),
            &at(0.8, 0.0),
            &rect(0.5, 0.5),
            &at(0.0, 0.0),
        )
        .unwrap();
        assert!((info.normal - Vec2::NEG_X).length() < EPS);
        assert_eq!(info.points.len(), 2);
    }

    #[test]
    fn test_box_box_no_intersection() {
        let result = compute_manifold(
            &rect(0.5, 0.5),
            &at(0.0, 0.0),
            &rect(0.5, 0.5),
            &at(1.5, 0.3),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_box_on_ground_prefers_first_shape_on_tie() {
        let ground = rect(5.0, 0.5);
        let crate_box = rect(0.5, 0.5);
        // Both the ground's top face and the box's bottom face report 0.1.
        let info = compute_manifold(&ground, &at(0.0, -0.5), &crate_box, &at(0.0, 0.4)).unwrap();
        assert!((info.normal - Vec2::Y).length() < EPS);
        assert!((info.penetration - 0.1).abs() < EPS);
        assert_eq!(info.points.len(), 2);

        let info = compute_manifold(&crate_box, &at(0.0, 0.4), &ground, &at(0.0, -0.5)).unwrap();
        assert!((info.normal - Vec2::NEG_Y).length() < EPS);
        assert_eq!(info.points.len(), 2);
        // Reference face is the box's bottom: points lie on the ground's top.
        for (p, _) in &info.points {
            assert!(p.y.abs() < EPS);
            assert!((p.x.abs() - 0.5).abs() < EPS);
        }
    }

    #[test]
    fn test_diamond_corner_uses_second_shape_reference() {
        let diamond = rect(0.5, 0.5);
        let pose = Pose::new(Vec2::new(0.0, 0.6), FRAC_PI_4);
        let ground = rect(5.0, 0.5);
        let info = compute_manifold(&diamond, &pose, &ground, &at(0.0, -0.5)).unwrap();

        let corner_y = 0.6 - 0.5 * 2.0f32.sqrt();
        assert!((info.normal - Vec2::NEG_Y).length() < EPS);
        assert!((info.penetration + corner_y).abs() < EPS);
        assert_eq!(info.points.len(), 1);
        assert!((info.points[0].0 - Vec2::new(0.0, corner_y)).length() < EPS);
    }

    #[test]
    fn test_circle_polygon() {
        let info = compute_manifold(&circle(0.5), &at(0.0, 0.9), &rect(0.5, 0.5), &at(0.0, 0.0))
            .unwrap();
        assert!((info.normal - Vec2::NEG_Y).length() < EPS);
        assert!((info.penetration - 0.1).abs() < EPS);
        assert!((info.points[0].0 - Vec2::new(0.0, 0.4)).length() < EPS);

        let info = compute_manifold(&rect(0.5, 0.5), &at(0.0, 0.0), &circle(0.5), &at(0.0, 0.9))
            .unwrap();
        assert!((info.normal - Vec2::Y).length() < EPS);
        assert!((info.penetration - 0.1).abs() < EPS);
        assert!((info.points[0].0 - Vec2::new(0.0, 0.4)).length() < EPS);
    }

    #[test]
    fn test_circle_near_polygon_corner() {
        // Inside both face slabs but outside the corner's reach.
        let result = compute_manifold(
            &circle(0.5),
            &at(0.9, 0.9),
            &rect(0.5, 0.5),
            &at(0.0, 0.0),
        );
        assert!(result.is_none());

        let info = compute_manifold(&circle(0.5), &at(0.8, 0.8), &rect(0.5, 0.5), &at(0.0, 0.0))
            .unwrap();
        let diagonal = Vec2::new(-1.0, -1.0).normalize();
        assert!((info.normal - diagonal).length() < EPS);
        let expected = 0.5 - 0.3 * 2.0f32.sqrt();
        assert!((info.penetration - expected).abs() < EPS);
    }

    #[test]
    fn test_clip_segment() {
        let mut face = [Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)];
        assert_eq!(clip_segment(&mut face, Vec2::X, 0.5), 2);
        assert_eq!(face[0], Vec2::new(-1.0, 0.0));
        assert!((face[1] - Vec2::new(0.5, 0.0)).length() < EPS);

        let mut face = [Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        assert_eq!(clip_segment(&mut face, Vec2::X, 0.5), 0);
    }

    #[test]
    fn test_detect_collisions_from_world() {
        let mut world = hecs::World::new();
        let a = world.spawn((
            RigidBody::new_static(),
            Collider::new(circle(1.0)),
        ));
        let b = world.spawn((
            RigidBody::new_static().with_position(Vec2::new(1.5, 0.0)),
            Collider::new(circle(1.0)),
        ));
        let c = world.spawn((RigidBody::new_dynamic(1.0, 1.0),));
        let far = world.spawn((
            RigidBody::new_dynamic(1.0, 1.0).with_position(Vec2::new(10.0, 0.0)),
            Collider::new(circle(1.0)),
        ));

        let manifolds = detect_collisions(&world, &[(a, b), (a, c), (a, a), (a, far)]);
        // Static-static contact is still reported.
        assert_eq!(manifolds.len(), 1);
        assert_eq!(manifolds[0].entity_a(), a);
        assert_eq!(manifolds[0].entity_b(), b);
        assert!((manifolds[0].depth - 0.5).abs() < EPS);
        assert_eq!(manifolds[0].contacts.len(), 1);
    }
}
