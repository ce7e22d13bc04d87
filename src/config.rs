//! Configuration for MeloDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a MeloDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all database files.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── .index           (one database name per line)
    ///     └── <name>           (one snapshot file per database)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Recovery Configuration
    // -------------------------------------------------------------------------
    /// What to do when a database file exists but cannot be decoded
    pub corrupt_recovery: CorruptRecovery,
}

/// Recovery policy for undecodable database files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptRecovery {
    /// Log a warning and start the store empty (the file is rewritten on the
    /// next mutation). Matches the historical behavior of the service.
    TreatAsEmpty,

    /// Fail the open with `MeloError::Corrupt`
    Fail,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./database"),
            corrupt_recovery: CorruptRecovery::TreatAsEmpty,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all database files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the recovery policy for undecodable database files
    pub fn corrupt_recovery(mut self, policy: CorruptRecovery) -> Self {
        self.config.corrupt_recovery = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
