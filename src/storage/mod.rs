//! Key/value persistence.
//!
//! This module defines the [`KeyValueStore`] trait mirroring the platform
//! persistence API (`setItem/getItem/removeItem/clear/getAllKeys/hasKey`).
//! Values are JSON-encoded strings; [`put_json`] and [`get_json`] do the
//! encoding for typed callers.
//!
//! Two backends are provided:
//! - [`MemoryStore`]: process-local map, for tests and ephemeral sessions
//! - [`SqliteStore`]: single-table `SQLite` database on the device

mod error;
mod memory;
mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage key for the user profile document.
pub const USER_PROFILE_KEY: &str = "userProfile";

/// Storage key for the onboarding-completed flag.
pub const ONBOARDING_COMPLETED_KEY: &str = "hasCompletedOnboarding";

/// Trait for string-keyed persistence of JSON-encoded values.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across threads.
/// There is no locking across calls: concurrent writers to the same key
/// race and the last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Stores a raw (already JSON-encoded) value under the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieves the raw value for the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the retrieval operation fails.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Removes the value for the given key. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Removes every key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be cleared.
    fn clear(&self) -> Result<()>;

    /// Lists all stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the keys cannot be listed.
    fn all_keys(&self) -> Result<Vec<String>>;

    /// Checks whether a key is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails.
    fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.all_keys()?.iter().any(|k| k == key))
    }
}

/// Serializes `value` to JSON and stores it under `key`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn put_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set_item(key, &json)
}

/// Reads the value under `key` and deserializes it from JSON.
///
/// # Errors
///
/// Returns an error if the read fails or the stored value is not valid JSON
/// for `T`.
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    store
        .get_item(key)?
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(StorageError::from)
}
