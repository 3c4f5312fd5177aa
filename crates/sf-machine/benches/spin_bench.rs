//! Machine Benchmarks
//!
//! Sampler draws, payout evaluation and complete spins on the logical clock.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sf_machine::{
    BetLedger, Board, Machine, MachineConfig, OutcomeSampler, PayoutEngine, Progression,
    SeededRandom, SymbolKind, WeightTable, select,
};

/// Weighted draws with and without the losing-streak override
fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");
    let board = Board::standard();
    let sampler = OutcomeSampler::new(10, board.relief_cells());

    for &losses in &[0u32, 10] {
        group.bench_with_input(BenchmarkId::new("sample", losses), &losses, |b, &losses| {
            let mut rng = SeededRandom::new(42);
            b.iter(|| black_box(sampler.sample(board.weights(), losses, &mut rng)))
        });
    }

    let weights = WeightTable::default();
    let total = weights.total();
    group.throughput(Throughput::Elements(total as u64));
    group.bench_function("select_full_range", |b| {
        b.iter(|| {
            for r in 0..total {
                black_box(select(&weights, r));
            }
        })
    });

    group.finish();
}

/// Rule evaluation over every cell
fn bench_payout(c: &mut Criterion) {
    let board = Board::standard();
    let engine = PayoutEngine::default();
    let mut bets = BetLedger::new();
    for symbol in SymbolKind::BETTABLE {
        let _ = bets.add(symbol);
    }
    let progression = Progression::default();

    c.bench_function("payout_all_cells", |b| {
        let mut rng = SeededRandom::new(7);
        b.iter(|| {
            for cell in board.cells() {
                black_box(engine.evaluate(cell, &bets, &progression, false, &mut rng));
            }
        })
    });
}

/// Full spins: request, step to rest, settle awards and counter
fn bench_full_spin(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_spin");

    for (name, config) in [
        ("normal", MachineConfig::default()),
        ("turbo", MachineConfig::turbo()),
    ] {
        group.bench_function(name, |b| {
            let mut machine = Machine::from_config(config.clone().with_seed(1)).unwrap();
            machine.place_bet(SymbolKind::Apple).unwrap();
            b.iter(|| {
                if machine.request_spin().is_err() {
                    machine.add_credits(1000);
                    return;
                }
                black_box(machine.run_until_idle().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sampler, bench_payout, bench_full_spin);
criterion_main!(benches);
