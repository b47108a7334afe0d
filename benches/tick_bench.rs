//! Criterion benchmarks for the simulation tick.
//!
//! Benchmarks:
//!   - one 50ms tick on a quiet grid
//!   - one 50ms tick on a half-burning grid (spread roll + burned percent)
//!   - a full extinguish of one fire at default click power
//!
//! Run with: cargo bench --bench tick_bench

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use firehero::core::types::CellId;
use firehero::core::GameConfig;
use firehero::persistence::MemoryStorage;
use firehero::simulation::{PlayerAction, Simulation};

fn session(config: GameConfig) -> Simulation {
    let mut sim = Simulation::new(config, Box::new(MemoryStorage::new()));
    sim.start();
    sim
}

// ---------------------------------------------------------------------------
// Benchmark: tick
// ---------------------------------------------------------------------------

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_tick");
    let step = Duration::from_millis(50);

    let quiet = GameConfig {
        seed: Some(1),
        spread_base: 0.0,
        spread_burn_factor: 0.0,
        // Keep autosave out of the measurement
        autosave_interval_ms: u64::MAX,
        ..GameConfig::default()
    };
    let mut sim = session(quiet.clone());
    group.bench_function("quiet_grid", |b| {
        b.iter(|| black_box(sim.tick(black_box(step))));
    });

    let mut sim = session(quiet);
    for id in 0..12 {
        let _ = sim.ignite(Some(CellId(id)));
    }
    group.bench_function("half_burning", |b| {
        b.iter(|| black_box(sim.tick(black_box(step))));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: extinguish
// ---------------------------------------------------------------------------

fn bench_extinguish(c: &mut Criterion) {
    let config = GameConfig {
        seed: Some(1),
        spread_base: 0.0,
        spread_burn_factor: 0.0,
        starting_water: 100.0,
        ..GameConfig::default()
    };

    c.bench_function("extinguish_one_fire", |b| {
        b.iter_batched(
            || {
                let mut sim = session(config.clone());
                let _ = sim.ignite(Some(CellId(0)));
                sim
            },
            |mut sim| {
                for _ in 0..4 {
                    let _ = black_box(sim.dispatch(PlayerAction::extinguish(CellId(0))));
                }
                sim
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_tick, bench_extinguish);
criterion_main!(benches);
