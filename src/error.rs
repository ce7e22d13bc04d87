//! Error types for MeloDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using MeloError
pub type Result<T> = std::result::Result<T, MeloError>;

/// Unified error type for MeloDB operations
#[derive(Debug, Error)]
pub enum MeloError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store / Registry Errors
    // -------------------------------------------------------------------------
    #[error("already exists: {name}")]
    AlreadyExists { name: String },

    #[error("not found: {name}")]
    NotFound { name: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MeloError {
    /// Construct an `AlreadyExists` for a database or row name
    pub fn already_exists(name: impl Into<String>) -> Self {
        MeloError::AlreadyExists { name: name.into() }
    }

    /// Construct a `NotFound` for a database or row name
    pub fn not_found(name: impl Into<String>) -> Self {
        MeloError::NotFound { name: name.into() }
    }

    /// True if this error means "the named thing was not there"
    pub fn is_not_found(&self) -> bool {
        matches!(self, MeloError::NotFound { .. })
    }
}
