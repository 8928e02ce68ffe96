//! Shared setup helpers for rein2d benchmarks.
//!
//! ## Running
//!
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//!
//! Filter by group:
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- solver

use glam::Vec2;
use rein2d::physics::narrowphase::detect_collisions;
use rein2d::{Collider, ContactManifold, PhysicsConfig, PhysicsWorld, Polygon, RigidBody, Shape};

// ---------------------------------------------------------------------------
// Basic scenes
// ---------------------------------------------------------------------------

fn grid_position(i: usize, cols: usize, spacing: f32) -> Vec2 {
    Vec2::new((i % cols) as f32 * spacing, (i / cols) as f32 * spacing)
}

/// Spawn `n` dynamic circles in a grid layout so neighbours overlap.
pub fn setup_circle_world(n: usize) -> anyhow::Result<hecs::World> {
    let mut world = hecs::World::new();
    let cols = (n as f32).sqrt().ceil() as usize;
    let shape = Shape::circle(1.0)?;

    for i in 0..n {
        world.spawn((
            RigidBody::from_shape(&shape, 1.0)?.with_position(grid_position(i, cols, 1.5)),
            Collider::new(shape.clone()),
        ));
    }
    Ok(world)
}

/// Mixed scene: dynamic circles alternating with static boxes.
pub fn setup_mixed_world(n: usize) -> anyhow::Result<hecs::World> {
    let mut world = hecs::World::new();
    let cols = (n as f32).sqrt().ceil() as usize;
    let circle = Shape::circle(1.0)?;
    let rect = Shape::rectangle(Vec2::splat(0.5))?;

    for i in 0..n {
        let position = grid_position(i, cols, 1.5);
        if i % 2 == 0 {
            world.spawn((
                RigidBody::from_shape(&circle, 1.0)?.with_position(position),
                Collider::new(circle.clone()),
            ));
        } else {
            world.spawn((
                RigidBody::new_static().with_position(position),
                Collider::new(rect.clone()),
            ));
        }
    }
    Ok(world)
}

/// Sparse scene: bodies spread far apart (no overlaps).
pub fn setup_sparse_world(n: usize) -> anyhow::Result<hecs::World> {
    let mut world = hecs::World::new();
    let cols = (n as f32).sqrt().ceil() as usize;
    let shape = Shape::circle(0.5)?;

    for i in 0..n {
        world.spawn((
            RigidBody::from_shape(&shape, 1.0)?.with_position(grid_position(i, cols, 10.0)),
            Collider::new(shape.clone()),
        ));
    }
    Ok(world)
}

/// Ground plus `n` dynamic bodies above it (circles, boxes and hexagons).
pub fn setup_scene(n: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    let physics = PhysicsWorld::new(PhysicsConfig::default());

    world.spawn((
        RigidBody::new_static().with_position(Vec2::new(0.0, -0.5)),
        Collider::new(Shape::rectangle(Vec2::new(200.0, 0.5))?),
    ));

    let shapes = [
        Shape::circle(0.5)?,
        Shape::rectangle(Vec2::splat(0.4))?,
        Shape::Polygon(Polygon::regular(0.5, 6)?),
    ];
    for i in 0..n {
        let shape = &shapes[i % shapes.len()];
        let x = (i % 50) as f32 * 1.2 - 30.0;
        let y = 1.0 + (i / 50) as f32 * 1.2 + (i % 5) as f32 * 0.1;
        world.spawn((
            RigidBody::from_shape(shape, 1.0)?.with_position(Vec2::new(x, y)),
            Collider::new(shape.clone()),
        ));
    }

    Ok((world, physics))
}

// ---------------------------------------------------------------------------
// Solver setup
// ---------------------------------------------------------------------------

/// A column of `n` slightly overlapping boxes on the ground, with manifolds.
pub fn setup_contacts(n: usize) -> anyhow::Result<(hecs::World, Vec<ContactManifold>)> {
    let mut world = hecs::World::new();
    let mut entities = Vec::with_capacity(n + 1);

    entities.push(world.spawn((
        RigidBody::new_static().with_position(Vec2::new(0.0, -0.5)),
        Collider::new(Shape::rectangle(Vec2::new(50.0, 0.5))?),
    )));

    let shape = Shape::rectangle(Vec2::splat(0.5))?;
    for i in 0..n {
        entities.push(world.spawn((
            RigidBody::from_shape(&shape, 1.0)?.with_position(Vec2::new(0.0, 0.49 + i as f32 * 0.99)),
            Collider::new(shape.clone()),
        )));
    }

    let pairs: Vec<_> = entities.windows(2).map(|w| (w[0], w[1])).collect();
    let manifolds = detect_collisions(&world, &pairs);
    Ok((world, manifolds))
}
