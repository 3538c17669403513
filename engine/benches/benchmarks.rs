//! Performance benchmarks for tablesync-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use tablesync_engine::{group_by_shape, make_key, ColumnarTable, Record, SyncPlan};

fn current_rows(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            Record::try_from(json!({
                "id": i as i64 + 1,
                "Email": format!("user{}@example.com", i),
                "Name": format!("User {}", i),
                "Age": (i % 90) as i64,
                "Tags": ["L", "a", "b"],
            }))
            .unwrap()
        })
        .collect()
}

/// Every third record changed, every tenth new.
fn desired_rows(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let email = if i % 10 == 0 {
                format!("new{}@example.com", i)
            } else {
                format!("user{}@example.com", i)
            };
            let age = if i % 3 == 0 { 100 } else { (i % 90) as i64 };
            Record::try_from(json!({
                "Email": email,
                "Name": format!("User {}", i),
                "Age": age,
            }))
            .unwrap()
        })
        .collect()
}

fn bench_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("planning");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("sync_plan", size), size, |b, &size| {
            let current = current_rows(size);
            let desired = desired_rows(size);
            b.iter(|| {
                SyncPlan::build(
                    black_box(current.clone()),
                    black_box(desired.clone()),
                    &["Email"],
                    None,
                )
            })
        });
    }

    group.bench_function("make_key", |b| {
        let record = current_rows(1).remove(0);
        b.iter(|| make_key(black_box(&record), &["Email", "Name"]))
    });

    group.finish();
}

fn bench_batching(c: &mut Criterion) {
    let mut group = c.benchmark_group("batching");

    for size in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("group_by_shape", size), size, |b, &size| {
            let plan = SyncPlan::build(current_rows(size), desired_rows(size), &["Email"], None)
                .unwrap();
            b.iter(|| group_by_shape(black_box(plan.updates.clone())))
        });

        group.bench_with_input(BenchmarkId::new("encode", size), size, |b, &size| {
            let rows = current_rows(size);
            b.iter(|| ColumnarTable::encode(black_box(&rows)))
        });

        group.bench_with_input(BenchmarkId::new("decode", size), size, |b, &size| {
            let table = ColumnarTable::encode(&current_rows(size));
            b.iter(|| black_box(&table).decode())
        });
    }

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");
    let table = ColumnarTable::encode(&current_rows(500));

    group.bench_function("table_to_json", |b| {
        b.iter(|| serde_json::to_string(black_box(&table)))
    });

    let json = serde_json::to_string(&table).unwrap();
    group.bench_function("table_from_json", |b| {
        b.iter(|| serde_json::from_str::<ColumnarTable>(black_box(&json)))
    });

    group.finish();
}

criterion_group!(benches, bench_planning, bench_batching, bench_serialization);
criterion_main!(benches);
