//! Tests for the in-memory column store
//!
//! These tests verify:
//! - Cell get/put/delete semantics
//! - Row deletion and pruning of empty rows
//! - Sorted row and column listings and column counts
//! - Table isolation
//! - Mutation apply and snapshot
//! - Concurrent access through a shared handle

use std::sync::Arc;
use std::thread;

use blockdir::store::log::Mutation;
use blockdir::{ColumnStore, MemoryStore};
use bytes::Bytes;

// =============================================================================
// Helper Functions
// =============================================================================

fn put(store: &MemoryStore, table: &str, row: &str, column: &str, value: &str) {
    store
        .put(
            table,
            row.as_bytes(),
            column.as_bytes(),
            Bytes::copy_from_slice(value.as_bytes()),
        )
        .unwrap();
}

fn row_names(store: &MemoryStore, table: &str) -> Vec<String> {
    store
        .rows(table)
        .unwrap()
        .into_iter()
        .map(|r| String::from_utf8(r).unwrap())
        .collect()
}

// =============================================================================
// Cell Tests
// =============================================================================

#[test]
fn test_get_missing_cell() {
    let store = MemoryStore::new();

    assert_eq!(store.get("t", b"row", b"col").unwrap(), None);
}

#[test]
fn test_put_then_get() {
    let store = MemoryStore::new();
    put(&store, "t", "row", "col", "value");

    let value = store.get("t", b"row", b"col").unwrap();

    assert_eq!(value, Some(Bytes::from_static(b"value")));
}

#[test]
fn test_put_overwrites() {
    let store = MemoryStore::new();
    put(&store, "t", "row", "col", "first");
    put(&store, "t", "row", "col", "second");

    assert_eq!(
        store.get("t", b"row", b"col").unwrap(),
        Some(Bytes::from_static(b"second"))
    );
    assert_eq!(store.cell_count(), 1);
}

#[test]
fn test_delete_cell() {
    let store = MemoryStore::new();
    put(&store, "t", "row", "a", "1");
    put(&store, "t", "row", "b", "2");

    store.delete("t", b"row", b"a").unwrap();

    assert_eq!(store.get("t", b"row", b"a").unwrap(), None);
    assert!(store.get("t", b"row", b"b").unwrap().is_some());
}

#[test]
fn test_delete_missing_is_noop() {
    let store = MemoryStore::new();

    store.delete("t", b"row", b"col").unwrap();
    store.delete_row("t", b"row").unwrap();

    assert_eq!(store.cell_count(), 0);
}

// =============================================================================
// Row Tests
// =============================================================================

#[test]
fn test_delete_row_removes_every_column() {
    let store = MemoryStore::new();
    put(&store, "t", "row", "a", "1");
    put(&store, "t", "row", "b", "2");
    put(&store, "t", "other", "a", "3");

    store.delete_row("t", b"row").unwrap();

    assert!(store.columns("t", b"row").unwrap().is_empty());
    assert_eq!(row_names(&store, "t"), vec!["other"]);
}

#[test]
fn test_rows_are_sorted_and_pruned() {
    let store = MemoryStore::new();
    put(&store, "t", "c", "x", "1");
    put(&store, "t", "a", "x", "1");
    put(&store, "t", "b", "x", "1");

    assert_eq!(row_names(&store, "t"), vec!["a", "b", "c"]);

    store.delete("t", b"b", b"x").unwrap();

    assert_eq!(row_names(&store, "t"), vec!["a", "c"]);
}

#[test]
fn test_columns_sorted_by_name() {
    let store = MemoryStore::new();
    for index in [2u64, 0, 1] {
        store
            .put(
                "blocks",
                b"file",
                &index.to_be_bytes(),
                Bytes::from(vec![index as u8]),
            )
            .unwrap();
    }

    let columns = store.columns("blocks", b"file").unwrap();
    let order: Vec<u8> = columns.iter().map(|(_, v)| v[0]).collect();

    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn test_column_count() {
    let store = MemoryStore::new();
    put(&store, "t", "r", "a", "1");
    put(&store, "t", "r", "b", "2");
    put(&store, "t", "other", "a", "3");

    assert_eq!(store.column_count("t", b"r").unwrap(), 2);
    assert_eq!(store.column_count("t", b"missing").unwrap(), 0);
    assert_eq!(store.column_count("nope", b"r").unwrap(), 0);

    store.delete("t", b"r", b"a").unwrap();
    assert_eq!(store.column_count("t", b"r").unwrap(), 1);
    assert_eq!(
        store.column_count("t", b"r").unwrap(),
        store.columns("t", b"r").unwrap().len()
    );
}

#[test]
fn test_tables_are_isolated() {
    let store = MemoryStore::new();
    put(&store, "one", "row", "col", "1");
    put(&store, "two", "row", "col", "2");

    store.delete_row("one", b"row").unwrap();

    assert!(store.rows("one").unwrap().is_empty());
    assert_eq!(
        store.get("two", b"row", b"col").unwrap(),
        Some(Bytes::from_static(b"2"))
    );
}

// =============================================================================
// Mutation Tests
// =============================================================================

#[test]
fn test_apply_mutations() {
    let store = MemoryStore::new();

    store.apply(Mutation::Put {
        table: "t".to_string(),
        row: b"r".to_vec(),
        column: b"a".to_vec(),
        value: b"1".to_vec(),
    });
    store.apply(Mutation::Put {
        table: "t".to_string(),
        row: b"r".to_vec(),
        column: b"b".to_vec(),
        value: b"2".to_vec(),
    });
    store.apply(Mutation::Delete {
        table: "t".to_string(),
        row: b"r".to_vec(),
        column: b"a".to_vec(),
    });

    assert_eq!(store.get("t", b"r", b"a").unwrap(), None);
    assert_eq!(store.cell_count(), 1);

    store.apply(Mutation::DeleteRow {
        table: "t".to_string(),
        row: b"r".to_vec(),
    });

    assert_eq!(store.cell_count(), 0);
}

#[test]
fn test_snapshot_rebuilds_identical_store() {
    let store = MemoryStore::new();
    put(&store, "t", "a", "x", "1");
    put(&store, "t", "b", "y", "2");
    put(&store, "u", "a", "x", "3");

    let copy = MemoryStore::new();
    for mutation in store.snapshot() {
        copy.apply(mutation);
    }

    assert_eq!(copy.cell_count(), 3);
    assert_eq!(row_names(&copy, "t"), vec!["a", "b"]);
    assert_eq!(
        copy.get("u", b"a", b"x").unwrap(),
        Some(Bytes::from_static(b"3"))
    );
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_on_distinct_rows() {
    let store = Arc::new(MemoryStore::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100u32 {
                    let row = format!("row_{}", t);
                    store
                        .put("t", row.as_bytes(), &i.to_be_bytes(), Bytes::from(vec![t as u8]))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.cell_count(), 400);
    assert_eq!(store.rows("t").unwrap().len(), 4);
}
