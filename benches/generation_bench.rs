//! Benchmarks for Nimlab oracles, simulation and assembly

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nimlab::assemble::{assemble, AssemblerConfig};
use nimlab::game::{nim, wythoff, RulesConfig};
use nimlab::naming::NamingPolicy;
use nimlab::realize;
use nimlab::simulate::Simulator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Benchmark both oracles
fn bench_oracles(c: &mut Criterion) {
    let mut group = c.benchmark_group("oracle");

    group.bench_function("nim_400", |b| {
        b.iter(|| {
            for n in 0..400u64 {
                black_box(nim::best_move(black_box(n), 3));
            }
        })
    });

    group.bench_function("wythoff_is_cold_1e9", |b| {
        b.iter(|| black_box(wythoff::is_cold(black_box(1_618_033_988), black_box(2_618_033_988))))
    });

    group.bench_function("wythoff_best_move_30x30", |b| {
        b.iter(|| {
            for a in 0..30u32 {
                for y in 0..30u32 {
                    black_box(wythoff::best_move(a, y));
                }
            }
        })
    });

    group.finish();
}

/// Benchmark one simulated and rendered example
fn bench_example(c: &mut Criterion) {
    let mut group = c.benchmark_group("example");
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for (name, config) in [
        ("nim", RulesConfig::nim(3, 400)),
        ("wythoff", RulesConfig::wythoff(30)),
    ] {
        let simulator = Simulator::new(config).unwrap();
        let policy = NamingPolicy::randomized();
        group.bench_function(name, |b| {
            b.iter(|| {
                let game = simulator.simulate(&mut rng);
                let answer = simulator.rules().best_move(game.terminal);
                let scheme = policy.resolve(answer, game.trace.len(), &mut rng);
                black_box(realize::render(simulator.config(), &scheme, &game, answer))
            })
        });
    }

    group.finish();
}

/// Benchmark full assembly with deduplication
fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");

    for &size in &[1_000usize, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{}_examples", size), |b| {
            b.iter(|| {
                let config = AssemblerConfig::new(vec![RulesConfig::nim(3, 400)])
                    .with_sizes(size, size / 10)
                    .with_seed(7);
                black_box(assemble(config).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_oracles, bench_example, bench_assemble);
criterion_main!(benches);
