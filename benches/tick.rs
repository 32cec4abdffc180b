//! Benchmarks for the per-tick pipeline and its hot stages.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use nodeflow::builder;
use nodeflow::routing::pick_weighted;
use nodeflow::spawn::SpawnRng;
use nodeflow::{FlowConfig, InteractionEvent, Simulation, TickInput};

const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

/// A simulation stepped until its population has settled.
fn warmed(config: FlowConfig) -> Simulation {
    let mut sim = Simulation::new(config, VIEWPORT, 42).expect("valid config");
    for _ in 0..600 {
        sim.step(TickInput::new(VIEWPORT));
    }
    sim
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for capacity in [400usize, 1600, 6400] {
        let mut config = FlowConfig::default();
        config.pool.capacity = capacity;
        let mut sim = warmed(config);
        group.bench_with_input(BenchmarkId::new("steady", capacity), &capacity, |b, _| {
            b.iter(|| black_box(sim.step(TickInput::new(VIEWPORT))))
        });
    }

    let mut sim = warmed(FlowConfig::default());
    sim.push_event(InteractionEvent::start(VIEWPORT * 0.5, 0));
    group.bench_function("held_pointer", |b| {
        b.iter(|| black_box(sim.step(TickInput::new(VIEWPORT))))
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let config = FlowConfig::default();
    c.bench_function("build_default_graph", |b| {
        b.iter(|| {
            let mut rng = SpawnRng::new(7);
            black_box(builder::build(&config, VIEWPORT * 0.5, &mut rng))
        })
    });
}

fn bench_routing(c: &mut Criterion) {
    let items = [(0u32, 1u32), (1, 2), (2, 4), (3, 1), (4, 1)];
    let mut rng = SpawnRng::new(3);
    c.bench_function("pick_weighted", |b| {
        b.iter(|| black_box(pick_weighted(black_box(&items), &mut rng)))
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let sim = warmed(FlowConfig::default());
    c.bench_function("snapshot", |b| b.iter(|| black_box(sim.snapshot())));
}

criterion_group!(benches, bench_step, bench_build, bench_routing, bench_snapshot);
criterion_main!(benches);
