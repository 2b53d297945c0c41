// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Key-Value Storage
//!
//! The session credential is the only thing persisted on the client. It lives
//! under a single key, [`ACCESS_TOKEN_KEY`]:
//!
//! - written on sign-in
//! - deleted on sign-out (or implicit expiry)
//! - read once when the session store hydrates
//!
//! The session store is the single writer. Nothing else should call `set` or
//! `remove` for that key.
//!
//! ## Backends
//!
//! - [`FileStore`] - one file per key under a directory, atomic writes
//! - [`MemoryStore`] - process-local, for tests and ephemeral sessions

pub mod file_store;
pub mod memory;

use std::io;

pub use file_store::FileStore;
pub use memory::MemoryStore;

/// Key holding the bearer credential.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Error type for key-value storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Key contains characters that cannot be used as a storage name
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Stored value is not valid UTF-8
    #[error("Stored value for '{0}' is not valid UTF-8")]
    Corrupt(String),

    /// A previous writer panicked while holding the store lock
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous string key-value store.
///
/// Mirrors the browser's local storage: reads are synchronous so the session
/// can be hydrated before the first navigation is evaluated.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Keys become file names, so restrict them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
