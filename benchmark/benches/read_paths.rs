// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Read path microbenchmarks.
//!
//! Compares reading a small table through its transaction log with reading
//! the same data files directly, for a few append counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lakebench_core::table::write_sequence;
use lakebench_core::{
    read_direct, DataGenerator, DataShape, DeltaTableStore, ParquetFileReader, TableStore,
    WriteOptions,
};
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;

const NROWS: usize = 8_192;
const NCOLS: usize = 20;
const APPEND_COUNTS: &[usize] = &[0, 4, 9];

fn build_table(runtime: &Runtime, root: &TempDir, nappend: usize) -> DeltaTableStore {
    let store = DeltaTableStore::new(root.path().join(format!("table_{}", nappend)));
    let shape = DataShape::new(NROWS, NCOLS).expect("valid shape");
    let mut generator = DataGenerator::new(Some(nappend as u64));
    runtime
        .block_on(write_sequence(
            &store,
            (0..=nappend).map(|_| generator.batch(shape)),
            &WriteOptions::default(),
        ))
        .expect("Failed to write table");
    store
}

fn bench_read_paths(c: &mut Criterion) {
    let runtime = Runtime::new().expect("Failed to create runtime");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let reader = ParquetFileReader::new();

    let mut group = c.benchmark_group("table_read");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(5));

    for &nappend in APPEND_COUNTS {
        let store = build_table(&runtime, &temp_dir, nappend);
        let files = runtime
            .block_on(store.list_files())
            .expect("Failed to list files");
        let rows = (NROWS * (nappend + 1)) as u64;
        group.throughput(Throughput::Elements(rows));

        group.bench_with_input(BenchmarkId::new("native", nappend), &store, |b, store| {
            b.to_async(&runtime).iter(|| async move {
                let snapshot = store.read().await.expect("native read failed");
                black_box(snapshot.num_rows())
            });
        });

        group.bench_with_input(BenchmarkId::new("direct", nappend), &files, |b, files| {
            b.iter(|| {
                let batch = read_direct(&reader, black_box(files)).expect("direct read failed");
                black_box(batch.num_rows())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_read_paths);
criterion_main!(benches);
