//! # vault-storage
//!
//! SQLite persistence for the dual-vault engine: vault snapshots with
//! angle and creation-time range queries, the tombstone archive used by
//! pruning and compaction, and a durable audit log.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::SqliteVaultStorage;

use vault_core::errors::{StorageError, VaultError};

/// Wrap a SQLite failure message into the crate-wide error.
pub(crate) fn to_storage_err(message: impl Into<String>) -> VaultError {
    VaultError::Storage(StorageError::SqliteError {
        message: message.into(),
    })
}

/// A stored JSON blob that no longer deserializes.
pub(crate) fn corrupt(key: impl Into<String>, err: impl std::fmt::Display) -> VaultError {
    VaultError::Storage(StorageError::CorruptRecord {
        key: key.into(),
        details: err.to_string(),
    })
}
