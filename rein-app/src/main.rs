//! Contact demo - a box stack, a ball and a hexagon settling on the ground.
//!
//! Run with: RUST_LOG=debug cargo run --manifest-path rein-app/Cargo.toml

use anyhow::Context;
use glam::Vec2;
use log::info;
use rein2d::{Collider, PhysicsConfig, PhysicsWorld, Polygon, RigidBody, Shape};

const FRAME_TIME: f64 = 1.0 / 60.0;
const FRAMES: u32 = 300;
const REMOVE_AT_FRAME: u32 = 150;

struct ContactDemo {
    physics: PhysicsWorld,
    bodies: Vec<(&'static str, hecs::Entity)>,
}

impl ContactDemo {
    fn new(world: &mut hecs::World) -> anyhow::Result<Self> {
        let physics = PhysicsWorld::new(PhysicsConfig::default());
        let mut bodies = Vec::new();

        // Ground (static rigid body)
        world.spawn((
            RigidBody::new_static().with_position(Vec2::new(0.0, -0.5)),
            Collider::new(Shape::rectangle(Vec2::new(20.0, 0.5))?),
        ));

        // Stack of unit boxes with small gaps
        let box_shape = Shape::rectangle(Vec2::splat(0.5))?;
        for (i, name) in ["box0", "box1", "box2"].into_iter().enumerate() {
            let y = 0.55 + i as f32 * 1.05;
            let entity = world.spawn((
                RigidBody::from_shape(&box_shape, 1.0)?
                    .with_position(Vec2::new(0.0, y))
                    .with_material(0.1, 0.6),
                Collider::new(box_shape.clone()),
            ));
            bodies.push((name, entity));
        }

        // Bouncy ball thrown at the stack
        let ball_shape = Shape::circle(0.4)?;
        let ball = world.spawn((
            RigidBody::from_shape(&ball_shape, 0.5)?
                .with_position(Vec2::new(4.0, 3.0))
                .with_linear_velocity(Vec2::new(-3.0, 0.0))
                .with_material(0.6, 0.3),
            Collider::new(ball_shape),
        ));
        bodies.push(("ball", ball));

        // Spinning hexagon
        let hexagon = Shape::Polygon(Polygon::regular(0.6, 6)?);
        let hex = world.spawn((
            RigidBody::from_shape(&hexagon, 1.0)?
                .with_position(Vec2::new(-3.0, 2.0))
                .with_angular_velocity(2.0),
            Collider::new(hexagon),
        ));
        bodies.push(("hexagon", hex));

        Ok(Self { physics, bodies })
    }

    fn update(&mut self, world: &mut hecs::World, frame: u32) -> anyhow::Result<()> {
        if frame == REMOVE_AT_FRAME {
            if let Some(index) = self.bodies.iter().position(|(name, _)| *name == "box2") {
                let (name, entity) = self.bodies.remove(index);
                self.physics
                    .remove_body(world, entity)
                    .with_context(|| format!("removing {name}"))?;
                info!("frame {frame}: removed {name}");
            }
        }

        self.physics.step(world, FRAME_TIME);

        if frame % 60 == 0 {
            info!(
                "frame {frame}: {} contacts, {} cached pairs",
                self.physics.contacts().len(),
                self.physics.contact_cache().len()
            );
        }
        Ok(())
    }

    fn report(&self, world: &hecs::World) -> anyhow::Result<()> {
        for (name, entity) in &self.bodies {
            let rb = world
                .get::<&RigidBody>(*entity)
                .with_context(|| format!("{name} has no rigid body"))?;
            info!(
                "{name:>8}: position ({:.3}, {:.3}) angle {:.3} speed {:.3}",
                rb.position.x,
                rb.position.y,
                rb.angle,
                rb.linear_velocity.length()
            );
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut world = hecs::World::new();
    let mut demo = ContactDemo::new(&mut world)?;

    for frame in 0..FRAMES {
        demo.update(&mut world, frame)?;
    }

    demo.report(&world)
}
