//! In-memory key/value store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::error::{Result, StorageError};
use super::KeyValueStore;

/// Process-local [`KeyValueStore`]. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        data.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        data.clear();
        Ok(())
    }

    fn all_keys(&self) -> Result<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        let mut keys: Vec<String> = data.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
