//! Snapshot storage implementation.

use crate::restore::{self, RestorePlan, RestoreSummary};
use crate::{capture, Fingerprint, SnapshotError, SnapshotRecord, SnapshotResult};
use serde::{Deserialize, Serialize};
use snapvc_storage::{JsonStorage, Storage, StorageError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Version written into every store entry.
pub const FORMAT_VERSION: u32 = 1;

/// Default store directory name, relative to the working-tree root.
pub const DEFAULT_STORE_DIR: &str = ".snapvc";

/// Configuration for snapshot storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Store directory, relative to the working-tree root.
    pub store_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

#[derive(Serialize)]
struct EntryRef<'a> {
    version: u32,
    #[serde(flatten)]
    record: &'a SnapshotRecord,
}

#[derive(Deserialize)]
struct Entry {
    version: u32,
    #[serde(flatten)]
    record: SnapshotRecord,
}

/// Handle on a working tree and its snapshot store.
///
/// Entries are kept one per fingerprint:
/// ```text
/// <root>/
///   .snapvc/
///     <fingerprint>.json   # version, fingerprint, paths, base64 file contents
/// ```
///
/// The store is append-only: entries are never overwritten or removed. There
/// is no locking, so two processes operating on the same tree at once may
/// interleave arbitrarily.
pub struct SnapshotStore<S = JsonStorage> {
    /// Working-tree root.
    root: PathBuf,

    /// Store location, excluded from capture and from the deletion scan.
    store_dir: PathBuf,

    storage: S,
}

impl SnapshotStore<JsonStorage> {
    /// Open the store for the working tree at `root`.
    ///
    /// Nothing is created on disk; see [`SnapshotStore::init`].
    pub fn open(root: impl Into<PathBuf>, config: &SnapshotConfig) -> Self {
        let root = root.into();
        let store_dir = root.join(&config.store_dir);
        let storage = JsonStorage::new(store_dir.clone());
        Self {
            root,
            store_dir,
            storage,
        }
    }
}

impl<S: Storage> SnapshotStore<S> {
    /// Build a store over an arbitrary storage backend.
    pub fn with_storage(root: impl Into<PathBuf>, store_dir: impl Into<PathBuf>, storage: S) -> Self {
        Self {
            root: root.into(),
            store_dir: store_dir.into(),
            storage,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// Ensure the store exists. Safe to call on an existing store.
    pub fn init(&self) -> SnapshotResult<()> {
        self.storage.init()?;
        debug!(path = %self.store_dir.display(), "Snapshot store ready");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.storage.is_initialized()
    }

    /// Capture the working tree without persisting it.
    pub fn capture(&self) -> SnapshotResult<SnapshotRecord> {
        capture::capture(&self.root, &self.store_dir)
    }

    /// Capture the working tree and persist the record.
    pub fn snapshot(&self) -> SnapshotResult<SnapshotRecord> {
        let record = self.capture()?;
        self.put(&record)?;
        Ok(record)
    }

    /// Persist a record under its fingerprint.
    ///
    /// Returns `false` when an entry with that fingerprint already exists; the
    /// existing entry is left untouched since equal fingerprints mean equal
    /// contents.
    pub fn put(&self, record: &SnapshotRecord) -> SnapshotResult<bool> {
        let key = record.fingerprint().as_str();
        if self.storage.exists(&[key])? {
            debug!(fingerprint = %key, "Snapshot already stored");
            return Ok(false);
        }

        let entry = EntryRef {
            version: FORMAT_VERSION,
            record,
        };
        self.storage.write(&[key], &entry)?;
        info!(
            fingerprint = %key,
            files = record.len(),
            "Stored snapshot"
        );
        Ok(true)
    }

    /// Load and verify a record.
    ///
    /// Unknown or malformed fingerprints give [`SnapshotError::NotFound`];
    /// entries that exist but fail to decode or verify give
    /// [`SnapshotError::Corrupted`].
    pub fn get(&self, fingerprint: &str) -> SnapshotResult<SnapshotRecord> {
        let Some(fingerprint) = Fingerprint::parse(fingerprint) else {
            return Err(SnapshotError::not_found(fingerprint));
        };

        let entry: Entry = match self.storage.read(&[fingerprint.as_str()]) {
            Ok(Some(entry)) => entry,
            Ok(None) => return Err(SnapshotError::not_found(fingerprint.as_str())),
            Err(e @ (StorageError::Json(_) | StorageError::Malformed(_))) => {
                return Err(SnapshotError::corrupted(format!(
                    "entry {fingerprint} cannot be decoded: {e}"
                )))
            }
            Err(e) => return Err(e.into()),
        };

        if entry.version != FORMAT_VERSION {
            return Err(SnapshotError::corrupted(format!(
                "entry {fingerprint} has unsupported format version {}",
                entry.version
            )));
        }
        if entry.record.fingerprint() != &fingerprint {
            return Err(SnapshotError::corrupted(format!(
                "entry {fingerprint} holds record {}",
                entry.record.fingerprint()
            )));
        }
        entry.record.validate()?;

        Ok(entry.record)
    }

    /// Check whether a fingerprint is stored, without loading it.
    pub fn exists(&self, fingerprint: &str) -> SnapshotResult<bool> {
        match Fingerprint::parse(fingerprint) {
            Some(fp) => Ok(self.storage.exists(&[fp.as_str()])?),
            None => Ok(false),
        }
    }

    /// List stored fingerprints, sorted.
    pub fn list(&self) -> SnapshotResult<Vec<Fingerprint>> {
        let mut fingerprints = Vec::new();
        for key in self.storage.list(&[])? {
            let Some(name) = key.last() else { continue };
            match Fingerprint::parse(name) {
                Some(fp) => fingerprints.push(fp),
                None => warn!(entry = %name, "Ignoring store entry with a non-fingerprint name"),
            }
        }
        fingerprints.sort();
        Ok(fingerprints)
    }

    /// Report what restoring `fingerprint` would change, without changing it.
    pub fn plan_restore(&self, fingerprint: &str) -> SnapshotResult<RestorePlan> {
        let record = self.get(fingerprint)?;
        restore::plan(&record, &self.root, &self.store_dir)
    }

    /// Restore the working tree to the recorded state.
    ///
    /// An unknown fingerprint fails with [`SnapshotError::NotFound`] before
    /// anything on disk is touched.
    pub fn restore(&self, fingerprint: &str) -> SnapshotResult<RestoreSummary> {
        let record = self.get(fingerprint)?;
        restore::apply(&record, &self.root, &self.store_dir)
    }
}
