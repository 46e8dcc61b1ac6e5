//! JSON file-based storage implementation.
//!
//! This storage backend stores each key as a separate JSON file.
//! Keys are mapped to file paths: `["snapshots", "3f2a"]` -> `snapshots/3f2a.json`

use crate::{Storage, StorageError, StorageResult};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// JSON file-based storage.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    base_path: PathBuf,
}

impl JsonStorage {
    /// Create a new JSON storage at the given base path.
    ///
    /// Nothing is created on disk until [`Storage::init`] or the first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// The directory holding all entries.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the file path for a key.
    pub fn key_to_path(&self, key: &[&str]) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::invalid_key("Key cannot be empty"));
        }

        // Validate key components (no path traversal)
        for component in key {
            if component.is_empty()
                || component.contains('/')
                || component.contains('\\')
                || *component == "."
                || *component == ".."
            {
                return Err(StorageError::invalid_key(format!(
                    "Invalid key component: {}",
                    component
                )));
            }
        }

        // Append rather than `set_extension` so keys containing dots survive intact
        let (last, parents) = key
            .split_last()
            .ok_or_else(|| StorageError::invalid_key("Key cannot be empty"))?;
        let mut path = self.prefix_to_dir(parents);
        path.push(format!("{last}.{EXTENSION}"));

        Ok(path)
    }

    /// Get the directory path for a prefix.
    fn prefix_to_dir(&self, prefix: &[&str]) -> PathBuf {
        let mut path = self.base_path.clone();
        for component in prefix {
            path.push(component);
        }
        path
    }
}

impl Storage for JsonStorage {
    fn init(&self) -> StorageResult<()> {
        debug!(path = %self.base_path.display(), "Ensuring storage directory");
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.base_path.is_dir()
    }

    fn read<T: DeserializeOwned>(&self, key: &[&str]) -> StorageResult<Option<T>> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Reading from storage");

        match fs::read(&path) {
            Ok(content) => {
                let value: T = serde_json::from_slice(&content)?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(_) if path.is_dir() => Err(StorageError::Malformed(format!(
                "{} is a directory",
                path.display()
            ))),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn write<T: Serialize>(&self, key: &[&str], value: &T) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        debug!(path = %path.display(), "Writing to storage");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_vec_pretty(value)?;

        // Write atomically (write to temp file, then rename)
        let temp_path = path.with_extension(TEMP_EXTENSION);
        fs::write(&temp_path, &content)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(StorageError::Io(e));
        }

        Ok(())
    }

    fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>> {
        let dir = self.prefix_to_dir(prefix);
        debug!(path = %dir.display(), "Listing storage");

        let mut results = Vec::new();

        match fs::read_dir(&dir) {
            Ok(entries) => {
                for entry in entries {
                    let path = entry?.path();

                    // Only include finished .json files, never in-flight temp files
                    if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
                        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                            let mut key: Vec<String> =
                                prefix.iter().map(|s| s.to_string()).collect();
                            key.push(stem.to_string());
                            results.push(key);
                        }
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // Directory doesn't exist, return empty list
            }
            Err(e) => return Err(StorageError::Io(e)),
        }

        results.sort();
        Ok(results)
    }

    fn exists(&self, key: &[&str]) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(path.is_file())
    }
}
