//! Benchmarks for MeloDB store operations
//!
//! The interesting number is the snapshot-write cost of a single-row update
//! as the store grows: every mutation rewrites the whole backing file, so
//! this is expected to scale with total store size, not row size.

use criterion::{criterion_group, criterion_main, Criterion};
use melodb::config::CorruptRecovery;
use melodb::store::Store;
use serde_json::json;
use tempfile::TempDir;

fn filled_store(rows: usize) -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open("bench", temp_dir.path(), CorruptRecovery::TreatAsEmpty).unwrap();
    for i in 0..rows {
        store
            .create(
                &format!("user_{:05}", i),
                Some(json!({"username": format!("user_{:05}", i), "playlists": []})),
            )
            .unwrap();
    }
    (temp_dir, store)
}

fn store_benchmarks(c: &mut Criterion) {
    // Single-row update cost vs. store size (whole-snapshot rewrite)
    for rows in [10usize, 100, 1000] {
        let (_temp, store) = filled_store(rows);
        c.bench_function(&format!("update_one_row_of_{}", rows), |b| {
            b.iter(|| {
                store
                    .update("user_00000", json!({"username": "user_00000", "plays": 1}))
                    .unwrap()
            })
        });
    }

    // Read path: clone-out-of-map under the read lock
    let (_temp, store) = filled_store(1000);
    c.bench_function("get_hot_row_of_1000", |b| {
        b.iter(|| store.get("user_00500").unwrap())
    });
}

criterion_group!(benches, store_benchmarks);
criterion_main!(benches);
