//! Hot-path throughput: insert, sample, priority update, and the combined
//! actor/learner loop, on a large memory.

use apex_replay_core::{PrioritizedReplayConfig, PrioritizedReplayMemory, TransitionRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const CAPACITY: usize = 1_000_000;
const PREFILL: usize = 100_000;
const CHUNK: usize = 64;
const SAMPLE_BATCH: usize = 50;

fn record() -> TransitionRecord {
    let state = (0..32).map(|_| fastrand::u8(..)).collect::<Vec<_>>();
    let next_state = (0..32).map(|_| fastrand::u8(..)).collect::<Vec<_>>();
    let action = vec![fastrand::u8(..); 4];
    TransitionRecord::new(state, action, fastrand::f64(), next_state, false)
}

fn prefilled() -> PrioritizedReplayMemory {
    let config = PrioritizedReplayConfig::default()
        .capacity(CAPACITY)
        .alpha(1.0)
        .seed(42);
    let mut memory = PrioritizedReplayMemory::build(&config).unwrap();
    memory
        .insert_batch((0..PREFILL).map(|_| record()).collect())
        .unwrap();
    memory
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.throughput(Throughput::Elements(1));
    let mut memory = prefilled();
    group.bench_function("single", |b| {
        b.iter(|| memory.insert(black_box(record())).unwrap())
    });

    group.throughput(Throughput::Elements(CHUNK as u64));
    let mut memory = prefilled();
    group.bench_function("chunked", |b| {
        b.iter(|| {
            let chunk = (0..CHUNK).map(|_| record()).collect::<Vec<_>>();
            memory.insert_batch(black_box(chunk)).unwrap()
        })
    });
    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    group.throughput(Throughput::Elements(SAMPLE_BATCH as u64));
    let mut memory = prefilled();
    group.bench_function("batch_50", |b| {
        b.iter(|| memory.sample(black_box(SAMPLE_BATCH), 1.0).unwrap())
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_priorities");
    group.throughput(Throughput::Elements(SAMPLE_BATCH as u64));
    let mut memory = prefilled();
    group.bench_function("batch_50", |b| {
        b.iter(|| {
            let indices = (0..SAMPLE_BATCH)
                .map(|_| fastrand::usize(..PREFILL))
                .collect::<Vec<_>>();
            let priorities = (0..SAMPLE_BATCH)
                .map(|_| 0.01 + fastrand::f64())
                .collect::<Vec<_>>();
            memory
                .update_priorities(black_box(&indices), black_box(&priorities))
                .unwrap()
        })
    });
    group.finish();
}

fn bench_combined(c: &mut Criterion) {
    let mut group = c.benchmark_group("combined");
    group.throughput(Throughput::Elements(1));
    let mut memory = prefilled();
    group.bench_function("insert_sample_update", |b| {
        b.iter(|| {
            let chunk = (0..32).map(|_| record()).collect::<Vec<_>>();
            memory.insert_batch(chunk).unwrap();
            let batch = memory.sample(SAMPLE_BATCH, 1.0).unwrap();
            let priorities = batch
                .records
                .iter()
                .map(|r| 0.01 + r.reward.abs())
                .collect::<Vec<_>>();
            memory.update_priorities(&batch.indices, &priorities).unwrap()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_sample,
    bench_update,
    bench_combined
);
criterion_main!(benches);
