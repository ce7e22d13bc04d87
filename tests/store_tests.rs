//! Tests for Store
//!
//! These tests verify:
//! - Row operations (get/create/update/delete/contains)
//! - Copy-on-read isolation
//! - Snapshot persistence and reload
//! - Failure atomicity (failed mutations change nothing)
//! - Corrupt/empty file recovery

use std::fs;

use melodb::config::CorruptRecovery;
use melodb::store::Store;
use melodb::MeloError;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open("testdb", temp_dir.path(), CorruptRecovery::TreatAsEmpty).unwrap();
    (temp_dir, store)
}

/// Decode the backing file the way a fresh open would
fn read_snapshot(store: &Store) -> Value {
    let bytes = fs::read(store.path()).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Open / Load Tests
// =============================================================================

#[test]
fn test_open_seeds_empty_snapshot() {
    let (_temp, store) = setup_temp_store();

    assert!(store.path().exists());
    assert!(store.is_empty());
    assert_eq!(read_snapshot(&store), json!({}));
}

#[test]
fn test_open_empty_file_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("testdb"), b"").unwrap();

    let store = Store::open("testdb", temp_dir.path(), CorruptRecovery::TreatAsEmpty).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_open_corrupt_file_treat_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("testdb"), b"not json at all").unwrap();

    let store = Store::open("testdb", temp_dir.path(), CorruptRecovery::TreatAsEmpty).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_open_corrupt_file_fail_policy() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("testdb"), b"not json at all").unwrap();

    let result = Store::open("testdb", temp_dir.path(), CorruptRecovery::Fail);
    assert!(matches!(result, Err(MeloError::Corrupt(_))));
}

#[test]
fn test_reload_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store =
            Store::open("testdb", temp_dir.path(), CorruptRecovery::TreatAsEmpty).unwrap();
        store.create("alice", Some(json!({"plays": 3}))).unwrap();
        store.create("bob", None).unwrap();
    }

    let store = Store::open("testdb", temp_dir.path(), CorruptRecovery::TreatAsEmpty).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("alice"), Some(json!({"plays": 3})));
    assert_eq!(store.get("bob"), Some(json!({})));
}

// =============================================================================
// Basic Row Operations
// =============================================================================

#[test]
fn test_create_and_get() {
    let (_temp, store) = setup_temp_store();

    store.create("alice", Some(json!({"plays": 1}))).unwrap();

    assert_eq!(store.get("alice"), Some(json!({"plays": 1})));
    assert!(store.contains("alice"));
}

#[test]
fn test_get_missing_returns_none() {
    let (_temp, store) = setup_temp_store();

    assert_eq!(store.get("nobody"), None);
    assert_eq!(store.get_or("nobody", json!({})), json!({}));
}

#[test]
fn test_create_without_value_stores_empty_object() {
    let (_temp, store) = setup_temp_store();

    store.create("alice", None).unwrap();

    assert_eq!(store.get("alice"), Some(json!({})));
}

#[test]
fn test_update_overwrites_and_persists() {
    let (_temp, store) = setup_temp_store();

    store.create("alice", Some(json!({"plays": 1}))).unwrap();
    store.update("alice", json!({"plays": 2})).unwrap();

    assert_eq!(store.get("alice"), Some(json!({"plays": 2})));
    assert_eq!(read_snapshot(&store), json!({"alice": {"plays": 2}}));
}

#[test]
fn test_delete_removes_and_persists() {
    let (_temp, store) = setup_temp_store();

    store.create("alice", None).unwrap();
    store.delete("alice").unwrap();

    assert!(!store.contains("alice"));
    assert_eq!(read_snapshot(&store), json!({}));
}

#[test]
fn test_delete_missing_fails() {
    let (_temp, store) = setup_temp_store();

    let result = store.delete("nobody");
    assert!(matches!(result, Err(MeloError::NotFound { .. })));
}

#[test]
fn test_contains_is_presence_not_truthiness() {
    let (_temp, store) = setup_temp_store();

    // A row holding an empty object is still present
    store.create("alice", Some(json!({}))).unwrap();
    assert!(store.contains("alice"));
}

#[test]
fn test_create_delete_symmetry() {
    let (_temp, store) = setup_temp_store();

    store.create("alice", Some(json!({"plays": 1}))).unwrap();
    let keys_before = store.keys();

    store.create("bob", None).unwrap();
    store.delete("bob").unwrap();

    assert_eq!(store.keys(), keys_before);
}

// =============================================================================
// Failure Atomicity
// =============================================================================

#[test]
fn test_create_duplicate_fails_and_changes_nothing() {
    let (_temp, store) = setup_temp_store();

    store.create("alice", Some(json!({"plays": 1}))).unwrap();
    let snapshot_before = read_snapshot(&store);

    let result = store.create("alice", Some(json!({"plays": 99})));

    assert!(matches!(result, Err(MeloError::AlreadyExists { .. })));
    assert_eq!(store.get("alice"), Some(json!({"plays": 1})));
    assert_eq!(read_snapshot(&store), snapshot_before);
}

#[test]
fn test_update_missing_fails_and_file_untouched() {
    let (_temp, store) = setup_temp_store();

    store.create("alice", None).unwrap();
    let snapshot_before = read_snapshot(&store);

    let result = store.update("bob", json!({"plays": 1}));

    assert!(matches!(result, Err(MeloError::NotFound { .. })));
    assert_eq!(read_snapshot(&store), snapshot_before);
}

#[test]
fn test_update_null_is_invalid_argument() {
    let (_temp, store) = setup_temp_store();

    store.create("alice", None).unwrap();

    let result = store.update("alice", Value::Null);

    assert!(matches!(result, Err(MeloError::InvalidArgument(_))));
    assert_eq!(store.get("alice"), Some(json!({})));
}

// =============================================================================
// Persistence Properties
// =============================================================================

#[test]
fn test_update_is_idempotent_on_disk() {
    let (_temp, store) = setup_temp_store();
    store.create("alice", None).unwrap();

    store.update("alice", json!({"plays": 5})).unwrap();
    let first = read_snapshot(&store);

    store.update("alice", json!({"plays": 5})).unwrap();
    let second = read_snapshot(&store);

    assert_eq!(first, second);
}

#[test]
fn test_get_returns_isolated_copy() {
    let (_temp, store) = setup_temp_store();

    store
        .create("alice", Some(json!({"playlists": ["road-trip"]})))
        .unwrap();

    // Mutate the returned value, including a nested container
    let mut copy = store.get("alice").unwrap();
    copy["playlists"].as_array_mut().unwrap().push(json!("gym"));
    copy["hacked"] = json!(true);

    // The store must be unaffected
    assert_eq!(
        store.get("alice"),
        Some(json!({"playlists": ["road-trip"]}))
    );
}
