//! Single-Database Store
//!
//! One named collection of rows backed by one snapshot file.
//!
//! ## Responsibilities
//! - Durable mapping of row key → structured value
//! - Rewrite the whole backing file on every mutation
//! - Copy-on-read so callers can never mutate store state in place
//! - Keep memory and disk synchronized, rolling back on failed writes

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::config::CorruptRecovery;
use crate::error::{MeloError, Result};

/// A named, file-backed mapping of row key → row value
///
/// ## Concurrency Model
///
/// - **Reads** (get/contains/len): Read lock on the row map, values are
///   deep-cloned out, so concurrent readers never observe partial mutations.
/// - **Writes** (create/update/delete): Write lock held across the whole
///   check → mutate → persist sequence, so mutations on one store are fully
///   serialized within the process.
///
/// There is no cross-process coordination: two processes opening the same
/// file race, and the later snapshot write wins wholesale. One store, one
/// process.
pub struct Store {
    /// Database name (also the backing file's name)
    name: String,

    /// Path of the backing snapshot file
    file: PathBuf,

    /// In-memory row map, kept in lockstep with the file
    rows: RwLock<BTreeMap<String, Value>>,
}

impl Store {
    /// Open or create a store backed by `{data_dir}/{name}`
    ///
    /// On open:
    /// 1. If the file does not exist, initialize it with an empty snapshot
    /// 2. Read and decode the snapshot
    /// 3. An empty file decodes as an empty row map
    /// 4. An undecodable file is handled per the recovery policy
    pub fn open(name: &str, data_dir: &Path, recovery: CorruptRecovery) -> Result<Self> {
        let file = data_dir.join(name);

        // Step 1: Seed a fresh file with an empty snapshot
        if !file.exists() {
            fs::write(&file, b"{}")?;
        }

        // Step 2: Load the snapshot
        let bytes = fs::read(&file)?;

        // Step 3: Tolerate a zero-length file (interrupted first write)
        let rows = if bytes.is_empty() {
            BTreeMap::new()
        } else {
            match serde_json::from_slice::<BTreeMap<String, Value>>(&bytes) {
                Ok(rows) => rows,
                // Step 4: Decode failure → recovery policy decides
                Err(e) => match recovery {
                    CorruptRecovery::TreatAsEmpty => {
                        tracing::warn!(
                            "Database '{}' snapshot undecodable ({}); starting empty",
                            name,
                            e
                        );
                        BTreeMap::new()
                    }
                    CorruptRecovery::Fail => {
                        return Err(MeloError::Corrupt(format!(
                            "database '{}' at {}: {}",
                            name,
                            file.display(),
                            e
                        )));
                    }
                },
            }
        };

        tracing::debug!("Opened database '{}' with {} rows", name, rows.len());

        Ok(Self {
            name: name.to_string(),
            file,
            rows: RwLock::new(rows),
        })
    }

    // =========================================================================
    // Row Operations
    // =========================================================================

    /// Get a row's value, or `None` if the key is absent
    ///
    /// Returns a deep clone: mutating the returned value cannot change what a
    /// subsequent `get` observes. Missing keys are not an error.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.rows.read().get(key).cloned()
    }

    /// Get a row's value, or `default` if the key is absent
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Create a row
    ///
    /// Fails with `AlreadyExists` if the key is present; the check happens
    /// before any state change, so a failed create leaves the store exactly
    /// as it was. `None` stores an empty object.
    pub fn create(&self, key: &str, value: Option<Value>) -> Result<()> {
        let mut rows = self.rows.write();

        if rows.contains_key(key) {
            return Err(MeloError::already_exists(key));
        }

        let value = value.unwrap_or_else(|| Value::Object(Map::new()));
        rows.insert(key.to_string(), value);

        // Roll the insert back if the snapshot cannot be written
        if let Err(e) = Self::persist(&self.file, &rows) {
            rows.remove(key);
            return Err(e);
        }

        Ok(())
    }

    /// Overwrite an existing row's value
    ///
    /// Fails with `NotFound` if the key is absent and with `InvalidArgument`
    /// if `value` is JSON `null`, the "no value" sentinel, as opposed to a
    /// legitimately empty object or array.
    pub fn update(&self, key: &str, value: Value) -> Result<()> {
        if value.is_null() {
            return Err(MeloError::InvalidArgument(
                "row value must not be null".to_string(),
            ));
        }

        let mut rows = self.rows.write();

        let slot = rows
            .get_mut(key)
            .ok_or_else(|| MeloError::not_found(key))?;
        let previous = std::mem::replace(slot, value);

        // Restore the previous value if the snapshot cannot be written
        if let Err(e) = Self::persist(&self.file, &rows) {
            rows.insert(key.to_string(), previous);
            return Err(e);
        }

        Ok(())
    }

    /// Delete a row
    ///
    /// Fails with `NotFound` if the key is absent.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut rows = self.rows.write();

        let previous = rows
            .remove(key)
            .ok_or_else(|| MeloError::not_found(key))?;

        // Re-insert if the snapshot cannot be written
        if let Err(e) = Self::persist(&self.file, &rows) {
            rows.insert(key.to_string(), previous);
            return Err(e);
        }

        Ok(())
    }

    /// True iff a row exists at `key`
    ///
    /// Pure key-presence test: a row holding an empty object is present.
    pub fn contains(&self, key: &str) -> bool {
        self.rows.read().contains_key(key)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// True iff the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// All row keys, in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.rows.read().keys().cloned().collect()
    }

    /// The database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the backing snapshot file
    pub fn path(&self) -> &Path {
        &self.file
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Rewrite the backing file from the current row map
    ///
    /// One whole-snapshot write per mutation (plain overwrite, no atomic
    /// rename). O(total store size) per call.
    fn persist(file: &Path, rows: &BTreeMap<String, Value>) -> Result<()> {
        let bytes = serde_json::to_vec(rows)
            .map_err(|e| MeloError::Serialization(e.to_string()))?;
        fs::write(file, bytes)?;
        Ok(())
    }
}
