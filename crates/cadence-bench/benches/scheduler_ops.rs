//! Criterion micro-benchmarks for scheduler insert and selection.

use std::hint::black_box;

use cadence_bench::{schedule_profile, HORIZON_MS};
use cadence_core::Timestamp;
use cadence_engine::Scheduler;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_insert");
    for n in [100usize, 1_000, 10_000] {
        let items = schedule_profile(n, 42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    let mut scheduler = Scheduler::new();
                    for item in items {
                        scheduler.insert(item);
                    }
                    black_box(scheduler)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_drain");
    for n in [100usize, 1_000] {
        let scheduler = Scheduler::from_items(schedule_profile(n, 42));
        group.bench_with_input(BenchmarkId::from_parameter(n), &scheduler, |b, scheduler| {
            b.iter_batched(
                || scheduler.clone(),
                |mut scheduler| {
                    let mut taken = 0usize;
                    while let Some(item) = scheduler.next_ready(Timestamp(HORIZON_MS / 2)) {
                        black_box(&item);
                        taken += 1;
                    }
                    taken
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut scheduler = Scheduler::from_items(schedule_profile(10_000, 42));
    // Tombstone a share of the items so export has something to filter.
    for _ in 0..1_000 {
        scheduler.next_ready(Timestamp(HORIZON_MS));
    }

    c.bench_function("scheduler_export_10k", |b| {
        b.iter(|| black_box(scheduler.export()));
    });
}

criterion_group!(benches, bench_insert, bench_drain, bench_export);
criterion_main!(benches);
