//! Benchmarks for the pure stages of the pipeline.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use effitherm::{efficiency, AlertConfig, AlertEngine, AlertState, Reading};

fn bench_compute(c: &mut Criterion) {
    c.bench_function("efficiency_compute", |b| {
        let mut t = 20.0;
        b.iter(|| {
            t = if t > 30.0 { 20.0 } else { t + 0.1 };
            black_box(efficiency::compute(black_box(t)))
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    c.bench_function("alert_evaluate", |b| {
        let engine = AlertEngine::new(AlertConfig::default());
        let mut state = AlertState::new();
        let now = Utc::now();
        let reading = Reading::new(now, 25.0);

        b.iter(|| black_box(engine.evaluate(&reading, &mut state, now)))
    });
}

criterion_group!(benches, bench_compute, bench_evaluate);
criterion_main!(benches);
