//! Scoped Row Transaction
//!
//! Read-modify-write access to one row: snapshot the value at `begin`,
//! mutate it in place, then `commit` to write it back through the owning
//! store exactly once.
//!
//! Nothing is written unless `commit` runs. `abort` (or simply dropping the
//! transaction, e.g. on an error path) discards the snapshot, so a failed
//! request can never half-persist its changes.
//!
//! This gives at-most-one-writer-per-scope discipline within a process; it is
//! not a cross-process lock. Two overlapping transactions on the same row
//! race, and the later commit wins.

use serde_json::{Map, Value};

use crate::error::{MeloError, Result};
use crate::model::User;
use crate::store::Store;

// =============================================================================
// Raw Row Transaction
// =============================================================================

/// A scoped transaction over one row's raw JSON value
///
/// The snapshot is `None` when the row does not exist yet; callers either
/// build a value up through `value_mut` (which starts from an empty object)
/// or `set` one wholesale. `commit` picks `create` vs `update` from whether
/// the row existed at `begin`.
pub struct RowTransaction<'a> {
    store: &'a Store,
    key: String,
    snapshot: Option<Value>,
    existed: bool,
    finished: bool,
}

impl<'a> RowTransaction<'a> {
    /// Snapshot the row's current value and begin the scope
    pub fn begin(store: &'a Store, key: &str) -> Self {
        let snapshot = store.get(key);
        let existed = snapshot.is_some();
        Self {
            store,
            key: key.to_string(),
            snapshot,
            existed,
            finished: false,
        }
    }

    /// True iff the row existed when the transaction began
    pub fn exists(&self) -> bool {
        self.existed
    }

    /// The row key this transaction is scoped to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The snapshot value, if any
    pub fn value(&self) -> Option<&Value> {
        self.snapshot.as_ref()
    }

    /// Mutable access to the snapshot value
    ///
    /// For an absent row this starts from an empty object, so the caller can
    /// build the new row in place.
    pub fn value_mut(&mut self) -> &mut Value {
        self.snapshot
            .get_or_insert_with(|| Value::Object(Map::new()))
    }

    /// Replace the snapshot value wholesale
    pub fn set(&mut self, value: Value) {
        self.snapshot = Some(value);
    }

    /// Write the snapshot back through the owning store and end the scope
    ///
    /// Exactly one write: `update` when the row pre-existed, `create` when it
    /// did not. Committing with no value at all, or a JSON `null`, is an
    /// `InvalidArgument`; both would erase the distinction between "row with
    /// empty data" and "no row".
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;

        let value = self.snapshot.take().ok_or_else(|| {
            MeloError::InvalidArgument(format!(
                "transaction on '{}' committed without a value",
                self.key
            ))
        })?;

        if value.is_null() {
            return Err(MeloError::InvalidArgument(
                "row value must not be null".to_string(),
            ));
        }

        if self.existed {
            self.store.update(&self.key, value)
        } else {
            self.store.create(&self.key, Some(value))
        }
    }

    /// End the scope without writing anything
    pub fn abort(mut self) {
        self.finished = true;
    }
}

impl Drop for RowTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                "Row transaction on '{}' dropped without commit; discarding",
                self.key
            );
        }
    }
}

// =============================================================================
// Typed User Transaction
// =============================================================================

/// A scoped transaction over one user row, decoded up front
///
/// The variant the playlist service actually uses: `begin` resolves the row
/// key (the username) to a `User`, failing loud on absent or malformed rows,
/// and `commit` re-encodes the mutated record.
pub struct UserTransaction<'a> {
    store: &'a Store,
    key: String,
    user: User,
    finished: bool,
}

impl<'a> UserTransaction<'a> {
    /// Decode the user row at `username` and begin the scope
    ///
    /// Fails with `NotFound` if no such row exists and with
    /// `InvalidArgument` if the row does not decode as a user record.
    pub fn begin(store: &'a Store, username: &str) -> Result<Self> {
        let value = store
            .get(username)
            .ok_or_else(|| MeloError::not_found(username))?;
        let user = User::from_value(&value)?;

        Ok(Self {
            store,
            key: username.to_string(),
            user,
            finished: false,
        })
    }

    /// The user record under mutation
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Mutable access to the user record
    pub fn user_mut(&mut self) -> &mut User {
        &mut self.user
    }

    /// Re-encode the user and write it back through the owning store
    ///
    /// The username is immutable: a record whose name no longer matches the
    /// row key is rejected rather than persisted under the wrong key.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;

        if self.user.username != self.key {
            return Err(MeloError::InvalidArgument(format!(
                "username changed from '{}' to '{}'; usernames are immutable",
                self.key, self.user.username
            )));
        }

        self.store.update(&self.key, self.user.to_value())
    }

    /// End the scope without writing anything
    pub fn abort(mut self) {
        self.finished = true;
    }
}

impl Drop for UserTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                "User transaction on '{}' dropped without commit; discarding",
                self.key
            );
        }
    }
}
