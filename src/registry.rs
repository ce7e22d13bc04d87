//! Database Registry
//!
//! Owns the set of named stores and keeps the on-disk index file consistent
//! with that set.
//!
//! ## Responsibilities
//! - Load the `.index` file at startup and open one store per listed name
//! - Create/delete databases, rewriting the index after each change
//! - Expose the well-known `users` database to the service layer

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{Config, CorruptRecovery};
use crate::error::{MeloError, Result};
use crate::store::Store;

/// The process-wide set of open stores plus the index file recording their
/// names
///
/// ## Invariant
/// After any create/delete completes, the index file lists exactly the
/// registered database names, one per line, in registration order.
///
/// ## Concurrency
/// The store list is behind a RwLock; lookups take the read lock, while
/// create/delete hold the write lock across the registry change and the
/// index rewrite.
pub struct Registry {
    /// Directory holding the index file and one snapshot file per database
    data_dir: PathBuf,

    /// Recovery policy handed to every store this registry opens
    corrupt_recovery: CorruptRecovery,

    /// Open stores, in registration order (drives index file order)
    stores: RwLock<Vec<Arc<Store>>>,

    /// The identified row-store for user accounts
    users: Arc<Store>,
}

impl Registry {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const INDEX_FILENAME: &'static str = ".index";
    const USERS_DB: &'static str = "users";

    /// Open a registry from the given config
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Read the index file (creating an empty one if absent)
    /// 3. Open or create a store per non-empty line
    /// 4. Locate the well-known `users` database, creating it if missing
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Read the index, seeding an empty one on first run
        let index_path = config.data_dir.join(Self::INDEX_FILENAME);
        if !index_path.exists() {
            fs::write(&index_path, b"")?;
        }
        let index_text = fs::read_to_string(&index_path)?;

        // Step 3: Open a store per listed name (ignoring blank lines and
        // duplicate entries left behind by hand edits)
        let mut stores: Vec<Arc<Store>> = Vec::new();
        for name in index_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if stores.iter().any(|s| s.name() == name) {
                continue;
            }
            let store = Store::open(name, &config.data_dir, config.corrupt_recovery)?;
            stores.push(Arc::new(store));
        }

        // Step 4: The users database always exists
        let users = match stores.iter().find(|s| s.name() == Self::USERS_DB) {
            Some(store) => Arc::clone(store),
            None => {
                let store = Arc::new(Store::open(
                    Self::USERS_DB,
                    &config.data_dir,
                    config.corrupt_recovery,
                )?);
                stores.push(Arc::clone(&store));
                store
            }
        };

        tracing::info!(
            "Registry opened with {} database(s) at {}",
            stores.len(),
            config.data_dir.display()
        );

        let registry = Self {
            data_dir: config.data_dir,
            corrupt_recovery: config.corrupt_recovery,
            stores: RwLock::new(stores),
            users,
        };

        // Rewrite the index so it reflects exactly what got registered
        registry.write_index(&registry.stores.read())?;

        Ok(registry)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    // =========================================================================
    // Database Operations
    // =========================================================================

    /// Return the store for `name`, creating and registering it if absent
    ///
    /// A newly created store gets its backing file seeded immediately, and
    /// the index file is rewritten to include it.
    pub fn open_or_create(&self, name: &str) -> Result<Arc<Store>> {
        if let Some(store) = self.get(name) {
            return Ok(store);
        }

        Self::validate_name(name)?;

        let mut stores = self.stores.write();

        // Re-check under the write lock; another caller may have won the race
        if let Some(store) = stores.iter().find(|s| s.name() == name) {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(Store::open(name, &self.data_dir, self.corrupt_recovery)?);
        stores.push(Arc::clone(&store));

        // Deregister again if the index cannot be rewritten
        if let Err(e) = self.write_index(&stores) {
            stores.pop();
            return Err(e);
        }

        tracing::debug!("Registered database '{}'", name);
        Ok(store)
    }

    /// Create a database
    ///
    /// Fails with `AlreadyExists` if `name` is already registered.
    pub fn create(&self, name: &str) -> Result<Arc<Store>> {
        if self.contains(name) {
            return Err(MeloError::already_exists(name));
        }
        self.open_or_create(name)
    }

    /// Delete a database
    ///
    /// Removes the backing file, drops the registry entry, and rewrites the
    /// index. Fails with `NotFound` if `name` is not registered. The `users`
    /// database cannot be deleted.
    pub fn delete(&self, name: &str) -> Result<()> {
        if name == Self::USERS_DB {
            return Err(MeloError::InvalidArgument(
                "the users database cannot be deleted".to_string(),
            ));
        }

        let mut stores = self.stores.write();

        let position = stores
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| MeloError::not_found(name))?;

        let store = stores.remove(position);

        // A hand-deleted backing file is not an error here
        match fs::remove_file(store.path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                stores.insert(position, store);
                return Err(e.into());
            }
        }

        self.write_index(&stores)?;

        tracing::debug!("Deleted database '{}'", name);
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Get the store for `name`, if registered
    pub fn get(&self, name: &str) -> Option<Arc<Store>> {
        self.stores
            .read()
            .iter()
            .find(|s| s.name() == name)
            .map(Arc::clone)
    }

    /// True iff a database named `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.stores.read().iter().any(|s| s.name() == name)
    }

    /// The identified row-store for user accounts
    pub fn users(&self) -> Arc<Store> {
        Arc::clone(&self.users)
    }

    /// All registered database names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.stores
            .read()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Number of registered databases
    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    /// True iff no databases are registered
    pub fn is_empty(&self) -> bool {
        self.stores.read().is_empty()
    }

    /// The data directory this registry owns
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Path of the index file
    fn index_path(&self) -> PathBuf {
        self.data_dir.join(Self::INDEX_FILENAME)
    }

    /// Rewrite the index file to list every registered name, one per line
    fn write_index(&self, stores: &[Arc<Store>]) -> Result<()> {
        let mut text = String::new();
        for store in stores {
            text.push_str(store.name());
            text.push('\n');
        }
        fs::write(self.index_path(), text)?;
        Ok(())
    }

    /// Reject names that cannot serve as snapshot filenames
    ///
    /// A leading `.` is reserved so a database can never shadow the index
    /// file itself.
    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(MeloError::InvalidArgument(
                "database name must not be empty".to_string(),
            ));
        }
        if name.starts_with('.') {
            return Err(MeloError::InvalidArgument(format!(
                "database name must not start with '.': {}",
                name
            )));
        }
        if name.chars().any(std::path::is_separator) {
            return Err(MeloError::InvalidArgument(format!(
                "database name must not contain path separators: {}",
                name
            )));
        }
        Ok(())
    }
}
