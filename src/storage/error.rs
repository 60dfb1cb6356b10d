//! Error types for key/value persistence.

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Backend(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A value could not be encoded or decoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock guarding the backend was poisoned.
    #[error("Failed to acquire storage lock: {0}")]
    Lock(String),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let err = StorageError::Backend("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn lock_error_display() {
        let err = StorageError::Lock("poisoned".to_string());
        assert_eq!(err.to_string(), "Failed to acquire storage lock: poisoned");
    }

    #[test]
    fn serialization_error_from_serde() {
        let serde_err = serde_json::from_str::<bool>("nope").unwrap_err();
        let err = StorageError::from(serde_err);
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
