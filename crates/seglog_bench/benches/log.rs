//! Log append and read benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seglog_bench::payload;
use seglog_core::{Config, Log, Record};
use tempfile::TempDir;

/// Benchmark appends across payload sizes.
fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_append");

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let log = Log::open(dir.path(), Config::default()).unwrap();
            let data = payload(size);

            b.iter(|| {
                let offset = log.append(Record::new(black_box(data.clone()))).unwrap();
                black_box(offset);
            });
        });
    }

    group.finish();
}

/// Benchmark reads across payload sizes.
fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_read");

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let log = Log::open(dir.path(), Config::default()).unwrap();

            // Write data first
            let offset = log.append(Record::new(payload(size))).unwrap();

            b.iter(|| {
                let record = log.read(black_box(offset)).unwrap();
                black_box(record);
            });
        });
    }

    group.finish();
}

/// Benchmark appends with per-append sync enabled.
fn bench_append_synced(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_append_synced");
    group.sample_size(20);

    group.bench_function("256", |b| {
        let dir = TempDir::new().unwrap();
        let log = Log::open(dir.path(), Config::default().sync_on_append(true)).unwrap();
        let data = payload(256);

        b.iter(|| {
            let offset = log.append(Record::new(black_box(data.clone()))).unwrap();
            black_box(offset);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_append, bench_read, bench_append_synced);
criterion_main!(benches);
