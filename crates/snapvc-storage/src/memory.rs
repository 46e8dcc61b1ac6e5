//! In-memory storage implementation for testing.

use crate::{Storage, StorageError, StorageResult};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory storage for testing.
///
/// Values are kept as serialized JSON so that reads go through the same
/// decoding path as the file backend. Nothing is persisted.
pub struct MemoryStorage {
    data: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store raw text under a key, bypassing serialization.
    ///
    /// Lets tests plant damaged entries.
    pub fn insert_raw(&self, key: &[&str], raw: impl Into<String>) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        data.insert(Self::key_to_string(key), raw.into());
        Ok(())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert a key slice to a storage key string.
    fn key_to_string(key: &[&str]) -> String {
        key.join("/")
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn init(&self) -> StorageResult<()> {
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn read<T: DeserializeOwned>(&self, key: &[&str]) -> StorageResult<Option<T>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        match data.get(&Self::key_to_string(key)) {
            Some(json) => {
                let value: T = serde_json::from_str(json)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, key: &[&str], value: &T) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::invalid_key("Key cannot be empty"));
        }
        let json = serde_json::to_string(value)?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        data.insert(Self::key_to_string(key), json);
        Ok(())
    }

    fn list(&self, prefix: &[&str]) -> StorageResult<Vec<Vec<String>>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let depth = prefix.len() + 1;
        let results = data
            .keys()
            .map(|k| k.split('/').map(String::from).collect::<Vec<_>>())
            .filter(|parts| {
                parts.len() == depth && parts.iter().zip(prefix).all(|(a, b)| a.as_str() == *b)
            })
            .collect();

        Ok(results)
    }

    fn exists(&self, key: &[&str]) -> StorageResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(data.contains_key(&Self::key_to_string(key)))
    }
}
