//! Physics engine benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- narrowphase

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rein2d::physics::broadphase::SweepAndPrune;
use rein2d::physics::narrowphase::{circle_circle, compute_manifold, polygon_polygon};
use rein2d::physics::solver::{ImpulseSolver, SolverConfig};
use rein2d::{Polygon, Pose, Shape};
use rein2d_bench::*;

// ---------------------------------------------------------------------------
// Broadphase
// ---------------------------------------------------------------------------

fn bench_broadphase(c: &mut Criterion) {
    let scenes: [(&str, fn(usize) -> anyhow::Result<hecs::World>); 3] = [
        ("broadphase/uniform_circles", setup_circle_world),
        ("broadphase/mixed_shapes", setup_mixed_world),
        ("broadphase/sparse", setup_sparse_world),
    ];

    for (name, setup) in scenes {
        let mut group = c.benchmark_group(name);
        for &n in &[100, 500, 1000, 2000] {
            let world = setup(n).expect("scene setup");
            let mut broadphase = SweepAndPrune::new();
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| broadphase.find_pairs(&world));
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Narrowphase
// ---------------------------------------------------------------------------

fn bench_narrowphase(c: &mut Criterion) {
    let origin = Pose::IDENTITY;
    let hit = Pose::from_position(Vec2::new(1.5, 0.0));
    let miss = Pose::from_position(Vec2::new(5.0, 0.0));

    {
        let mut group = c.benchmark_group("narrowphase/circle_circle");
        group.bench_function("intersecting", |b| {
            b.iter(|| circle_circle(1.0, &origin, 1.0, &hit));
        });
        group.bench_function("separated", |b| {
            b.iter(|| circle_circle(1.0, &origin, 1.0, &miss));
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/box_box");
        let square = Polygon::rectangle(Vec2::splat(1.0)).expect("square");
        group.bench_function("intersecting", |b| {
            b.iter(|| polygon_polygon(&square, &origin, &square, &hit));
        });
        group.bench_function("separated", |b| {
            b.iter(|| polygon_polygon(&square, &origin, &square, &miss));
        });
        let rotated = Pose::new(Vec2::new(1.5, 0.0), 0.785);
        group.bench_function("rotated", |b| {
            b.iter(|| polygon_polygon(&square, &origin, &square, &rotated));
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/dispatch");
        let circle = Shape::circle(1.0).expect("circle");
        let square = Shape::rectangle(Vec2::splat(1.0)).expect("square");
        let octagon = Shape::Polygon(Polygon::regular(1.0, 8).expect("octagon"));

        group.bench_function("circle_circle", |b| {
            b.iter(|| compute_manifold(&circle, &origin, &circle, &hit));
        });
        group.bench_function("box_box", |b| {
            b.iter(|| compute_manifold(&square, &origin, &square, &hit));
        });
        group.bench_function("box_circle", |b| {
            b.iter(|| compute_manifold(&square, &origin, &circle, &hit));
        });
        group.bench_function("circle_box", |b| {
            b.iter(|| compute_manifold(&circle, &origin, &square, &hit));
        });
        group.bench_function("octagon_octagon", |b| {
            b.iter(|| compute_manifold(&octagon, &origin, &octagon, &hit));
        });
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

fn bench_solver(c: &mut Criterion) {
    let solver = ImpulseSolver::new(SolverConfig::default());
    let dt = 1.0 / 60.0;

    {
        let mut group = c.benchmark_group("solver/contact_count");
        for &n in &[10, 50, 100, 500] {
            let (mut world, manifolds) = setup_contacts(n).expect("contact setup");
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter_batched(
                    || manifolds.clone(),
                    |mut m| solver.resolve(&mut world, &mut m, 8, dt),
                    criterion::BatchSize::SmallInput,
                );
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("solver/iterations");
        let (mut world, manifolds) = setup_contacts(100).expect("contact setup");
        for &iters in &[1, 4, 8, 16, 32] {
            group.bench_with_input(BenchmarkId::from_parameter(iters), &iters, |b, &iters| {
                b.iter_batched(
                    || manifolds.clone(),
                    |mut m| solver.resolve(&mut world, &mut m, iters, dt),
                    criterion::BatchSize::SmallInput,
                );
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

fn bench_pipeline(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("pipeline/step");
        group.sample_size(30);
        for &n in &[50, 100, 500, 1000] {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter_batched(
                    || setup_scene(n).expect("scene setup"),
                    |(mut world, mut physics)| {
                        physics.step(&mut world, 1.0 / 60.0);
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("pipeline/sustained_60steps");
        group.sample_size(10);
        for &n in &[100, 500] {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter_batched(
                    || setup_scene(n).expect("scene setup"),
                    |(mut world, mut physics)| {
                        for _ in 0..60 {
                            physics.step(&mut world, 1.0 / 60.0);
                        }
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }
}

criterion_group!(
    benches,
    bench_broadphase,
    bench_narrowphase,
    bench_solver,
    bench_pipeline
);
criterion_main!(benches);
