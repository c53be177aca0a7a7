//! Benchmarks for the producer-side cost of emitting records.

use std::time::{Duration, Instant};

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use femtoscribe::{
    FemtoLevel, FemtoScribeHandler, FormatTemplate, RetryPolicy, SharedFormatter, ShipperConfig,
    test_utils::FakeCollector,
};

const BATCH: u64 = 1_000;

fn handler(collector: &FakeCollector, capacity: usize) -> FemtoScribeHandler {
    FemtoScribeHandler::with_dialer(
        collector.dialer(),
        "bench",
        SharedFormatter::default(),
        RetryPolicy {
            attempts: 1,
            delay: Duration::ZERO,
        },
        ShipperConfig::default().with_capacity(capacity),
    )
    .expect("build handler")
}

fn submit_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit");

    group.bench_function("emit_and_flush", |b| {
        let collector = FakeCollector::new();
        let handler = handler(&collector, BATCH as usize);
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let start = Instant::now();
                for i in 0..BATCH {
                    let _ = handler.emit(
                        FemtoLevel::Info,
                        "benches/submit.rs",
                        1,
                        format_args!("record {i}"),
                    );
                }
                handler.flush();
                total += start.elapsed();
            }
            total
        });
    });

    group.bench_function("reject_when_full", |b| {
        let collector = FakeCollector::new();
        collector.stall();
        let handler = handler(&collector, 1);
        let _ = handler.emit(FemtoLevel::Info, "benches/submit.rs", 1, format_args!("a"));
        collector.wait_for_send_start_of("a", Duration::from_secs(1));
        let _ = handler.emit(FemtoLevel::Info, "benches/submit.rs", 1, format_args!("b"));
        b.iter(|| {
            black_box(handler.emit(
                FemtoLevel::Info,
                "benches/submit.rs",
                1,
                format_args!("shed"),
            ))
        });
        collector.release();
    });

    group.bench_function("template_render", |b| {
        let template = FormatTemplate::default();
        let record = femtoscribe::FemtoLogRecord::new(
            FemtoLevel::Warning,
            "src/service/handler.rs",
            42,
            "request failed",
        );
        b.iter(|| black_box(template.render(black_box(&record))));
    });

    group.finish();
}

criterion_group!(benches, submit_benchmarks);
criterion_main!(benches);
