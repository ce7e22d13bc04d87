//! # MeloDB
//!
//! An embedded per-file record store, built as the persistence core of a
//! small self-hosted music playlist service:
//! - Named databases, each backed by one snapshot file
//! - A line-oriented `.index` file tracking database names
//! - Scoped row transactions with explicit commit/abort
//! - A typed domain model (Song / Playlist / User)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Web Layer (external)                      │
//! │           (routing, sessions, request validation)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Scoped Row Transaction                      │
//! │            (snapshot → mutate → commit / abort)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Registry   │          │    Store    │
//!   │  (.index)   │──owns──▶ │  (RwLock)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Snapshot   │
//!                           │   (file)    │
//!                           └─────────────┘
//! ```
//!
//! Every mutation rewrites its store's whole backing file. That keeps the
//! format trivial and recovery logic nonexistent at the cost of O(store size)
//! per write, which is the intended trade-off for a low-write personal
//! dataset.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod registry;
pub mod txn;
pub mod model;
pub mod auth;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MeloError, Result};
pub use config::{Config, CorruptRecovery};
pub use store::Store;
pub use registry::Registry;
pub use txn::{RowTransaction, UserTransaction};
pub use model::{Playlist, SessionFlags, Song, User};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of MeloDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
