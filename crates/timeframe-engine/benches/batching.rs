use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use timeframe_engine::{plan_batches, TimeframeRegistry, DEFAULT_BATCH_SIZE};

const DAY_MS: i64 = 86_400_000;

fn bench_plan_year_of_minutes(c: &mut Criterion) {
    c.bench_function("plan_batches 1m over 365 days", |b| {
        b.iter(|| {
            plan_batches(
                black_box(60_000),
                black_box(0),
                black_box(365 * DAY_MS),
                DEFAULT_BATCH_SIZE,
            )
        })
    });
}

fn bench_registry_hit(c: &mut Criterion) {
    let registry = TimeframeRegistry::with_defaults();
    c.bench_function("registry resolve cached literal", |b| {
        b.iter(|| registry.resolve_literal(black_box("15m")))
    });
}

criterion_group!(benches, bench_plan_year_of_minutes, bench_registry_hit);
criterion_main!(benches);
