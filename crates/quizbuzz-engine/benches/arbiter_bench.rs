//! Benchmarks for buzz arbitration and round handling.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench arbiter_bench
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use quizbuzz_core::{ContestantId, InputBits, Question};
use quizbuzz_engine::{AdvancePolicy, BuzzArbiter, GameConfig, RoundEngine};
use std::hint::black_box;

fn bench_arbitrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("arbitrate");
    group.throughput(Throughput::Elements(1));

    let pressed = InputBits::from_mask(0b1011_0110, 8);
    let lockouts = InputBits::from_mask(0b0000_0110, 8);

    group.bench_function("eight_inputs_two_locked", |b| {
        b.iter(|| BuzzArbiter::arbitrate(black_box(&pressed), black_box(&lockouts)));
    });

    let all = InputBits::from_mask(u32::MAX, 32);
    let none_locked = InputBits::empty(32);
    group.bench_function("thirty_two_inputs", |b| {
        b.iter(|| BuzzArbiter::arbitrate(black_box(&all), black_box(&none_locked)));
    });

    group.finish();
}

fn bench_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("round");
    group.throughput(Throughput::Elements(1));

    let question = Question::from_slots("Q", ["a", "b", "c", "d"], 3).unwrap();
    let config = GameConfig::default().advance_policy(AdvancePolicy::HostPaced);

    group.bench_function("four_wrong_answers", |b| {
        b.iter(|| {
            let mut engine = RoundEngine::new(config.clone()).unwrap();
            engine.start(vec![question.clone()]);
            for i in 0..4u8 {
                let round = engine.round();
                let _ = engine.on_buzz(InputBits::from_mask(0b1111, 4), round);
                let contestant = ContestantId::new(i, 4).unwrap();
                let _ = engine.submit_answer(contestant, 0);
            }
            black_box(engine.snapshot());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_arbitrate, bench_round);
criterion_main!(benches);
