//! Storage backend benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rollcall_bench::json_document;
use rollcall_storage::{FileBackend, InMemoryBackend, StorageBackend};
use tempfile::TempDir;

/// Benchmark InMemoryBackend replace operations.
fn bench_inmemory_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_replace");

    for size in [1024, 16 * 1024, 256 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let backend = InMemoryBackend::new();
            let data = json_document(size);

            b.iter(|| backend.replace(black_box(&data)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark FileBackend atomic replace (stage, fsync, rename).
fn bench_file_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_replace");
    group.sample_size(30);

    for size in [1024, 16 * 1024, 256 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let backend = FileBackend::new(&temp_dir.path().join("db.json"));
            let data = json_document(size);

            b.iter(|| backend.replace(black_box(&data)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark FileBackend load operations.
fn bench_file_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_load");

    for size in [1024, 16 * 1024, 256 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let backend = FileBackend::new(&temp_dir.path().join("db.json"));
            backend.replace(&json_document(size)).unwrap();

            b.iter(|| {
                let bytes = backend.load().unwrap();
                black_box(bytes);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_inmemory_replace,
    bench_file_replace,
    bench_file_load,
);

criterion_main!(benches);
