//! Snapshot error types.

use snapvc_storage::StorageError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors that can occur during snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot not found. An expected outcome, not a failure of the store.
    #[error("Snapshot not found: {0}")]
    NotFound(String),

    /// A working-tree file could not be read, written or deleted.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A store entry exists but cannot be trusted.
    #[error("Snapshot storage corrupted: {0}")]
    Corrupted(String),

    /// Storage layer error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SnapshotError {
    /// Create a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a corrupted storage error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }

    /// Create an IO error for the given path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this is the expected "no such snapshot" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
