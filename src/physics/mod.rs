//! 2D rigid body contact engine: narrowphase manifolds and impulse resolution.
//!
//! # Architecture
//!
//! The physics pipeline runs in a fixed timestep loop:
//!
//! 1. Apply forces (gravity)
//! 2. Integrate velocities
//! 3. Broadphase collision detection (sweep and prune over AABBs)
//! 4. Narrowphase collision detection (SAT with face clipping)
//! 5. Warm start from the contact cache
//! 6. Solve contact constraints (sequential impulse + positional correction)
//! 7. Integrate positions
//! 8. Clear force accumulators
//!
//! Steps 4 to 6 are exposed on their own through [`PhysicsWorld::step_contacts`]
//! for callers that run their own integrator and pair filtering.

pub mod broadphase;
pub mod cache;
pub mod contact;
pub mod narrowphase;
pub mod rigid_body;
pub mod shape;
pub mod solver;

use glam::Vec2;
use tracing::debug;

use self::broadphase::SweepAndPrune;
use self::cache::ContactCache;
use self::contact::ContactManifold;
use self::solver::{ImpulseSolver, SolverConfig};

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector. Default: (0, -9.81).
    pub gravity: Vec2,
    /// Fixed timestep for physics updates in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of sub-steps per frame. Default: 4.
    pub max_substeps: u32,
    /// Number of constraint solver iterations. Default: 8.
    pub solver_iterations: u32,
    /// Fraction of penetration corrected per step. Default: 0.2.
    pub position_correction: f32,
    /// Penetration tolerated without correction. Default: 0.01.
    pub penetration_slop: f32,
    /// Seed impulses from the previous step's contacts. Default: true.
    pub warm_starting: bool,
    /// Approach speed at or below which contacts do not bounce. Zero keeps
    /// slow collisions elastic. Default: 0.2.
    pub restitution_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
            solver_iterations: 8,
            position_correction: 0.2,
            penetration_slop: 0.01,
            warm_starting: true,
            restitution_threshold: 0.2,
        }
    }
}

impl From<&PhysicsConfig> for SolverConfig {
    fn from(config: &PhysicsConfig) -> Self {
        Self {
            position_correction: config.position_correction,
            penetration_slop: config.penetration_slop,
            warm_starting: config.warm_starting,
            restitution_threshold: config.restitution_threshold,
        }
    }
}

/// The main physics world managing simulation state.
///
/// Bodies live in a caller-owned `hecs::World` as `RigidBody` + `Collider`
/// components; this type only holds the stepping state and the contact cache.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    accumulator: f64,
    broadphase: SweepAndPrune,
    solver: ImpulseSolver,
    cache: ContactCache,
    contacts: Vec<ContactManifold>,
}

impl PhysicsWorld {
    /// Create a new physics world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        let solver = ImpulseSolver::new(SolverConfig::from(&config));
        Self {
            config,
            accumulator: 0.0,
            broadphase: SweepAndPrune::new(),
            solver,
            cache: ContactCache::new(),
            contacts: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Manifolds produced by the most recent step.
    pub fn contacts(&self) -> &[ContactManifold] {
        &self.contacts
    }

    pub fn contact_cache(&self) -> &ContactCache {
        &self.cache
    }

    /// Step the physics simulation forward by `delta_time` seconds.
    ///
    /// Uses a fixed timestep accumulator to ensure deterministic simulation.
    pub fn step(&mut self, world: &mut hecs::World, delta_time: f64) {
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.fixed_step(world, self.config.fixed_timestep as f32);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            self.accumulator = 0.0;
        }
    }

    /// Run narrowphase, warm start, resolution and cache update for one step.
    ///
    /// `pairs` are candidate pairs already filtered by the caller.
    pub fn step_contacts(
        &mut self,
        world: &mut hecs::World,
        pairs: &[(hecs::Entity, hecs::Entity)],
        dt: f32,
    ) -> &[ContactManifold] {
        let mut manifolds = narrowphase::detect_collisions(world, pairs);
        if self.config.warm_starting {
            self.cache.warm_start(&mut manifolds);
        }
        self.solver
            .resolve(world, &mut manifolds, self.config.solver_iterations, dt);
        self.cache.update(&manifolds);

        debug!(
            pairs = pairs.len(),
            manifolds = manifolds.len(),
            cached = self.cache.len(),
            "contact step"
        );
        self.contacts = manifolds;
        &self.contacts
    }

    /// Narrowphase only; does not touch bodies or the cache.
    pub fn detect_collisions(
        &self,
        world: &hecs::World,
        pairs: &[(hecs::Entity, hecs::Entity)],
    ) -> Vec<ContactManifold> {
        narrowphase::detect_collisions(world, pairs)
    }

    /// Resolve externally produced manifolds with this world's solver settings.
    pub fn resolve(
        &self,
        world: &mut hecs::World,
        manifolds: &mut [ContactManifold],
        iterations: u32,
        dt: f32,
    ) {
        self.solver.resolve(world, manifolds, iterations, dt);
    }

    /// Despawn `entity` and forget every contact it took part in.
    pub fn remove_body(
        &mut self,
        world: &mut hecs::World,
        entity: hecs::Entity,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.cache.remove_body(entity);
        self.contacts.retain(|m| !m.bodies.contains(&entity));
        world.despawn(entity)
    }

    fn fixed_step(&mut self, world: &mut hecs::World, dt: f32) {
        // 1. Apply forces (gravity)
        rigid_body::apply_gravity(world, self.config.gravity);

        // 2. Integrate velocities
        rigid_body::integrate_velocities(world, dt);

        // 3. Broadphase collision detection
        let pairs = self.broadphase.find_pairs(world);

        // 4-6. Narrowphase, warm start, solve
        self.step_contacts(world, &pairs, dt);

        // 7. Integrate positions
        rigid_body::integrate_positions(world, dt);

        // 8. Clear force accumulators
        rigid_body::clear_forces(world);
    }
}
