//! Snapshot record: the unit of persisted state.

use crate::{Fingerprint, FingerprintHasher, SnapshotError, SnapshotResult};
use serde::{Deserialize, Serialize};
use snapvc_util::path::is_safe_relative;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Full contents of a captured tree.
///
/// Paths are relative to the working-tree root. `paths` keeps traversal
/// order and always holds exactly the keys of `files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    fingerprint: Fingerprint,
    paths: Vec<PathBuf>,
    #[serde(with = "base64_contents")]
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl SnapshotRecord {
    /// Assemble a record from capture output.
    pub(crate) fn new(
        fingerprint: Fingerprint,
        paths: Vec<PathBuf>,
        files: BTreeMap<PathBuf, Vec<u8>>,
    ) -> Self {
        debug_assert_eq!(paths.len(), files.len());
        Self {
            fingerprint,
            paths,
            files,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Captured paths in traversal order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn files(&self) -> &BTreeMap<PathBuf, Vec<u8>> {
        &self.files
    }

    /// Recorded bytes for a path, if it was captured.
    pub fn content(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Iterate `(path, content)` pairs in traversal order.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, &[u8])> {
        self.paths
            .iter()
            .filter_map(|path| self.files.get(path).map(|c| (path.as_path(), c.as_slice())))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Sum of all file sizes in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.files.values().map(|c| c.len() as u64).sum()
    }

    /// Check every structural invariant of a record loaded from the store.
    ///
    /// Fails with [`SnapshotError::Corrupted`] when `paths` and `files`
    /// disagree, a path could escape the working tree, or the contents no
    /// longer hash to the fingerprint.
    pub fn validate(&self) -> SnapshotResult<()> {
        let unique: BTreeSet<&PathBuf> = self.paths.iter().collect();
        if unique.len() != self.paths.len() {
            return Err(self.corrupted("path list contains duplicates"));
        }
        if self.paths.len() != self.files.len()
            || !self.paths.iter().all(|p| self.files.contains_key(p))
        {
            return Err(self.corrupted("path list does not match file contents"));
        }
        if let Some(bad) = self.paths.iter().find(|p| !is_safe_relative(p)) {
            return Err(self.corrupted(format!("unsafe path {}", bad.display())));
        }

        let mut hasher = FingerprintHasher::new();
        for (_, content) in self.entries() {
            hasher.update(content);
        }
        let actual = hasher.finish();
        if actual != self.fingerprint {
            return Err(self.corrupted(format!("contents hash to {actual}")));
        }

        Ok(())
    }

    fn corrupted(&self, reason: impl std::fmt::Display) -> SnapshotError {
        SnapshotError::corrupted(format!("record {}: {reason}", self.fingerprint))
    }
}

/// File contents travel as base64 strings so entries stay valid JSON
/// for arbitrary binary data.
mod base64_contents {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    pub fn serialize<S: Serializer>(
        files: &BTreeMap<PathBuf, Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            files
                .iter()
                .map(|(path, content)| (path, STANDARD.encode(content))),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<PathBuf, Vec<u8>>, D::Error> {
        let encoded = BTreeMap::<PathBuf, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(path, text)| {
                let content = STANDARD.decode(text.as_bytes()).map_err(|e| {
                    D::Error::custom(format!("invalid content for {}: {e}", path.display()))
                })?;
                Ok((path, content))
            })
            .collect()
    }
}
