//! Durable key-value storage for the serialized cart.
//!
//! The cart is stored as a single JSON string under one key, read once when
//! the store loads and overwritten wholesale on every commit.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - process-local map, used in tests and ephemeral sessions
//! - [`FileStorage`] - one file per key in a directory, written atomically

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::fmt::Debug;

use thiserror::Error;

/// Errors that can occur when reading or writing stored values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value exists but cannot be decoded.
    #[error("Corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// A value could not be encoded for storage.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A string key-value store that survives restarts.
///
/// All methods take `&self`; implementations use interior mutability.
pub trait PersistentKv: Send + Sync + Debug {
    /// Read a value. Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Succeeds even if the key did not exist.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
