//! Collision and simulation benchmarks for farm_core.
//!
//! Run with: `cargo bench -p farm_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use farm_core::collision::{CollisionMap, SamplingPolicy};
use farm_core::math::{Fixed, Vec2Fixed};
use farm_test_utils::fixtures::{farm_obstacles, pt, sample_simulation};

/// Path checks against the sample farm layout.
pub fn collision_benchmark(c: &mut Criterion) {
    let map = CollisionMap::new(farm_obstacles(), SamplingPolicy::default());
    let radius = Fixed::from_num(8);

    c.bench_function("is_path_blocked_clear", |b| {
        b.iter(|| {
            map.is_path_blocked(
                black_box(pt(100, 500)),
                black_box(pt(600, 500)),
                black_box(radius),
            )
        })
    });

    c.bench_function("is_path_blocked_through_pond", |b| {
        b.iter(|| {
            map.is_path_blocked(
                black_box(pt(650, 240)),
                black_box(pt(900, 240)),
                black_box(radius),
            )
        })
    });

    c.bench_function("is_blocked_point", |b| {
        b.iter(|| map.is_blocked(black_box(Vec2Fixed::from_num(760.5, 240.25))))
    });
}

/// One simulated minute of the sample farm at frame granularity.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("sample_farm_one_minute", |b| {
        b.iter(|| {
            let mut sim = sample_simulation(black_box(42));
            for t in (0..=60_000).step_by(16) {
                sim.advance_to(t);
            }
            sim.state_hash()
        })
    });
}

criterion_group!(benches, collision_benchmark, simulation_benchmark);
criterion_main!(benches);
