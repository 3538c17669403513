//! Edge case tests for tablesync-engine
//!
//! These tests cover boundary conditions and unusual inputs.

use serde_json::json;
use tablesync_engine::{
    make_key, BackendCall, CellValue, ColumnarTable, MemoryBackend, Reconciler, Record, SyncPlan,
};

fn rec(value: serde_json::Value) -> Record {
    Record::try_from(value).unwrap()
}

// ============================================================================
// String Edge Cases
// ============================================================================

#[tokio::test]
async fn unicode_keys_match() {
    let names = vec![
        "日本語テスト",
        "Привет мир",
        "مرحبا بالعالم",
        "🎉🚀💯",
        "Hello\nWorld\tTab",
        "Null\0Test",
        "quote\"inside",
        "",
    ];
    let desired: Vec<Record> = names.iter().map(|n| rec(json!({"Name": n}))).collect();

    let backend = MemoryBackend::new().with_table("T", vec![]);
    let reconciler = Reconciler::new(&backend);
    let first = reconciler
        .sync("T", desired.clone(), &["Name"], None)
        .await
        .unwrap();
    assert_eq!(first.num_added, names.len());

    let second = reconciler.sync("T", desired, &["Name"], None).await.unwrap();
    assert_eq!((second.num_added, second.num_updated), (0, 0));
}

#[test]
fn very_long_strings_key_distinctly() {
    let long = "x".repeat(1024 * 1024);
    let mut longer = long.clone();
    longer.push('x');

    let a = rec(json!({"s": long}));
    let b = rec(json!({"s": longer}));
    assert_ne!(make_key(&a, &["s"]), make_key(&b, &["s"]));
}

#[test]
fn empty_string_is_not_null() {
    let empty = rec(json!({"s": ""}));
    let null = rec(json!({"s": null}));
    assert_ne!(make_key(&empty, &["s"]), make_key(&null, &["s"]));
}

// ============================================================================
// Numeric Edge Cases
// ============================================================================

#[test]
fn integer_boundaries_round_trip() {
    let records: Vec<Record> = [i64::MIN, i64::MAX, 0, -1, 1]
        .iter()
        .enumerate()
        .map(|(i, v)| rec(json!({"id": i as i64 + 1, "n": v})))
        .collect();

    let table = ColumnarTable::encode(&records);
    let wire = serde_json::to_string(&table).unwrap();
    let parsed: ColumnarTable = serde_json::from_str(&wire).unwrap();
    assert_eq!(parsed.decode().unwrap(), records);
}

#[test]
fn float_and_integer_forms_are_one_value() {
    let current = vec![rec(json!({"id": 1, "k": 2, "price": 10}))];
    let desired = vec![rec(json!({"k": 2.0, "price": 10.0}))];

    let plan = SyncPlan::build(current, desired, &["k"], None).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.unchanged, 1);
}

#[test]
fn fractional_values_differ() {
    let current = vec![rec(json!({"id": 1, "k": 1, "price": 0.1}))];
    let desired = vec![rec(json!({"k": 1, "price": 0.10000001}))];

    let plan = SyncPlan::build(current, desired, &["k"], None).unwrap();
    assert_eq!(plan.updates.len(), 1);
}

#[test]
fn large_unsigned_numbers_are_floats() {
    let cell: CellValue = serde_json::from_value(json!(u64::MAX)).unwrap();
    assert!(matches!(cell, CellValue::Float(_)));
}

// ============================================================================
// Compound Value Edge Cases
// ============================================================================

#[test]
fn compound_key_columns() {
    let current = vec![
        rec(json!({"id": 1, "ref": ["R", "People", 1], "v": 1})),
        rec(json!({"id": 2, "ref": ["R", "People", 2], "v": 1})),
    ];
    let desired = vec![rec(json!({"ref": ["R", "People", 2], "v": 5}))];

    let plan = SyncPlan::build(current, desired, &["ref"], None).unwrap();
    assert_eq!(plan.updates, vec![rec(json!({"id": 2, "v": 5}))]);
}

#[test]
fn nested_compound_payloads() {
    let cell: CellValue =
        serde_json::from_value(json!(["O", {"a": [1, 2.0]}, ["nested", null]])).unwrap();
    let same: CellValue =
        serde_json::from_value(json!(["O", {"a": [1.0, 2]}, ["nested", null]])).unwrap();
    assert_eq!(cell, same);
}

#[tokio::test]
async fn object_payload_key_matches_regardless_of_field_order() {
    let backend = MemoryBackend::new().with_table(
        "T",
        vec![rec(json!({"k": ["O", {"a": 1, "b": 2}], "v": 1}))],
    );
    let result = Reconciler::new(&backend)
        .sync(
            "T",
            vec![rec(json!({"k": ["O", {"b": 2, "a": 1}], "v": 1}))],
            &["k"],
            None,
        )
        .await
        .unwrap();

    assert_eq!((result.num_added, result.num_updated), (0, 0));
    assert_eq!(backend.rows("T").len(), 1);
}

#[test]
fn reordered_object_payloads_collide() {
    let current = vec![
        rec(json!({"id": 1, "k": ["O", {"a": 1, "b": 2}]})),
        rec(json!({"id": 2, "k": ["O", {"b": 2, "a": 1}]})),
    ];
    let err = SyncPlan::build(current, vec![], &["k"], None).unwrap_err();
    assert!(matches!(
        err,
        tablesync_engine::Error::KeyCollision { first: 1, second: 2, .. }
    ));
}

#[test]
fn records_must_be_objects() {
    assert!(Record::try_from(json!([1, 2])).is_err());
    assert!(Record::try_from(json!({"bad": {"nested": true}})).is_err());
}

// ============================================================================
// Empty Input Edge Cases
// ============================================================================

#[tokio::test]
async fn empty_desired_only_fetches() {
    let backend = MemoryBackend::new().with_table("T", vec![rec(json!({"n": 1}))]);
    let result = Reconciler::new(&backend)
        .sync("T", vec![], &["n"], None)
        .await
        .unwrap();

    assert_eq!((result.num_added, result.num_updated), (0, 0));
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn empty_bulk_operations_send_nothing() {
    let backend = MemoryBackend::new().with_table("T", vec![]);
    let reconciler = Reconciler::new(&backend);

    assert!(reconciler.add_records("T", &[]).await.unwrap().is_empty());
    reconciler.update_records("T", vec![]).await.unwrap();
    reconciler.delete_records("T", &[]).await.unwrap();
    assert!(backend.calls().is_empty());
}

#[test]
fn missing_key_column_keys_as_null() {
    let current = vec![rec(json!({"id": 1, "k": null, "v": 1}))];
    let desired = vec![rec(json!({"v": 2}))];

    let plan = SyncPlan::build(current, desired, &["k"], None).unwrap();
    assert_eq!(plan.updates, vec![rec(json!({"id": 1, "v": 2}))]);
}

#[tokio::test]
async fn insert_payload_keeps_mixed_shapes_in_one_call() {
    let backend = MemoryBackend::new().with_table("T", vec![]);
    Reconciler::new(&backend)
        .sync(
            "T",
            vec![rec(json!({"k": 1, "a": 1})), rec(json!({"k": 2, "b": 2}))],
            &["k"],
            None,
        )
        .await
        .unwrap();

    match &backend.write_calls()[..] {
        [BackendCall::Insert { rows, .. }] => {
            assert_eq!(rows.column("a").unwrap(), &[Some(CellValue::Int(1)), None][..]);
        }
        other => panic!("expected one insert, got {other:?}"),
    }
    // The store never saw a value for the cells a record left out
    assert_eq!(backend.rows("T")[1], rec(json!({"id": 2, "k": 2, "b": 2})));
}
