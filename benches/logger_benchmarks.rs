//! Criterion benchmarks for spectral_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use spectral_logger::format_entry;
use spectral_logger::prelude::*;
use tempfile::TempDir;

fn bench_logger(temp_dir: &TempDir, name: &str) -> Logger {
    Logger::builder()
        .path(temp_dir.path().join(name))
        .console(false)
        .min_level(LogLevel::Info)
        .build()
        .expect("Failed to create logger")
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    group.bench_function("plain", |b| {
        b.iter(|| {
            format_entry(
                LogLevel::Info,
                black_box("Request processed"),
                None,
                &TimestampFormat::Millis,
            )
        });
    });

    let detail = ErrorDetail::new("std::io::Error", "connection reset")
        .with_backtrace_text("   at handler\n   at server\n   at main");
    group.bench_function("with_error", |b| {
        b.iter(|| {
            format_entry(
                LogLevel::Error,
                black_box("Request failed"),
                Some(detail.clone()),
                &TimestampFormat::Millis,
            )
        });
    });

    group.finish();
}

// ============================================================================
// Producer Latency Benchmarks
// ============================================================================

fn bench_producer(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = bench_logger(&temp_dir, "bench.log");

    let mut group = c.benchmark_group("producer");
    group.throughput(Throughput::Elements(1));

    group.bench_function("filtered", |b| {
        b.iter(|| logger.log(LogLevel::Debug, black_box("Filtered message"), None));
    });

    group.bench_function("log", |b| {
        b.iter(|| logger.log(LogLevel::Info, black_box("Queued message"), None));
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime");
    group.bench_function("log_async", |b| {
        b.iter(|| {
            runtime.block_on(logger.log_async(LogLevel::Info, black_box("Queued message"), None))
        });
    });

    group.finish();
    logger.dispose();
}

criterion_group!(benches, bench_formatting, bench_producer);
criterion_main!(benches);
