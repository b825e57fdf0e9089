//! Criterion benchmarks for log_dispatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use log_dispatch::prelude::*;
use std::sync::Arc;
use std::thread;

/// Sink that discards everything, to measure pipeline overhead only
struct NullSink;

impl Sink for NullSink {
    fn send(&mut self, text: &str) -> Result<()> {
        black_box(text);
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn null_dispatcher() -> Dispatcher {
    let dispatcher = Dispatcher::new();
    for level in Severity::ALL {
        dispatcher.add_sink(level, NullSink).unwrap();
    }
    dispatcher
}

// ============================================================================
// Severity Benchmarks
// ============================================================================

fn bench_severity_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("severity_parse");
    group.throughput(Throughput::Elements(1));

    group.bench_function("valid", |b| {
        b.iter(|| black_box("WARNING").parse::<Severity>());
    });

    group.bench_function("invalid", |b| {
        b.iter(|| black_box("warning").parse::<Severity>());
    });

    group.finish();
}

// ============================================================================
// Enqueue Benchmarks
// ============================================================================

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue");
    group.throughput(Throughput::Elements(1));

    let dispatcher = null_dispatcher();
    let named = Client::with_queue(Some("bench"), dispatcher.queue());
    let unnamed = Client::with_queue(None::<&str>, dispatcher.queue());

    group.bench_function("named_client", |b| {
        b.iter(|| {
            named.info(black_box("Info message")).unwrap();
            dispatcher.queue().pop()
        });
    });

    group.bench_function("unnamed_client", |b| {
        b.iter(|| {
            unnamed.info(black_box("Info message")).unwrap();
            dispatcher.queue().pop()
        });
    });

    group.bench_function("string_level", |b| {
        b.iter(|| {
            named.message(black_box("Info message"), black_box("INFO")).unwrap();
            dispatcher.queue().pop()
        });
    });

    group.finish();
}

// ============================================================================
// Drain Benchmarks
// ============================================================================

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_once");

    for batch in [1usize, 100, 1_000] {
        group.throughput(Throughput::Elements(batch as u64));
        let dispatcher = null_dispatcher();
        let client = Client::with_queue(Some("bench"), dispatcher.queue());

        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &batch| {
            b.iter(|| {
                for i in 0..batch {
                    client.error(i.to_string()).unwrap();
                }
                dispatcher.drain_once().unwrap()
            });
        });
    }

    group.finish();
}

// ============================================================================
// Concurrent Producer Benchmarks
// ============================================================================

fn bench_concurrent_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_producers");

    for producers in [2usize, 4, 8] {
        let per_producer = 250;
        group.throughput(Throughput::Elements((producers * per_producer) as u64));
        let dispatcher = Arc::new(null_dispatcher());

        group.bench_with_input(
            BenchmarkId::from_parameter(producers),
            &producers,
            |b, &producers| {
                b.iter(|| {
                    let handles: Vec<_> = (0..producers)
                        .map(|p| {
                            let client =
                                Client::with_queue(Some(format!("p{}", p)), dispatcher.queue());
                            thread::spawn(move || {
                                for i in 0..per_producer {
                                    client.notice(i.to_string()).unwrap();
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                    dispatcher.drain_once().unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_severity_parse,
    bench_enqueue,
    bench_drain,
    bench_concurrent_producers,
);

criterion_main!(benches);
