//! Storage layer for snapvc.
//!
//! This crate provides a key-value storage abstraction with two backends:
//! - JSON file storage (one file per key, used for the snapshot store)
//! - In-memory storage (for testing)
//!
//! All operations are synchronous and unsynchronized across processes; the
//! callers are expected to run one store operation at a time.

pub mod error;
pub mod json;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use json::JsonStorage;
pub use memory::MemoryStorage;

use serde::{de::DeserializeOwned, Serialize};

/// A trait for key-value storage backends.
///
/// Keys are represented as path segments, e.g., `["snapshots", "3f2a..."]`.
/// Values are serialized/deserialized as JSON.
pub trait Storage: Send + Sync {
    /// Ensure the backing location exists. Safe to call repeatedly.
    fn init(&self) -> StorageResult<()>;

    /// Whether the backing location has been created.
    fn is_initialized(&self) -> bool;

    /// Read a value from storage.
    ///
    /// Returns `None` if the key doesn't exist.
    fn read<T: DeserializeOwned>(&self, key: &[&str]) -> StorageResult<Option<T>>;

    /// Write a value to storage.
    ///
    /// Creates parent directories if necessary. Readers never observe a
    /// partially written value.
    fn write<T: Serialize>(&self, key: &[&str], value: &T) -> StorageResult<()>;

    /// List all keys under a prefix.
    ///
    /// Returns the full key paths for each item, sorted.
    fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>>;

    /// Check if a key exists.
    fn exists(&self, key: &[&str]) -> StorageResult<bool>;
}
