//! Error types for profile operations.

use thiserror::Error;

use crate::storage::StorageError;

/// Error type for profile operations.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// An update was attempted before any profile was created.
    #[error("No user profile found")]
    NotFound,

    /// Reading or writing the persisted document failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    /// The stored document was written by a newer schema.
    #[error("Unsupported profile schema version: {0}")]
    UnsupportedSchema(u32),

    /// The stored document cannot be interpreted as a profile.
    #[error("Invalid profile document: {0}")]
    InvalidDocument(String),
}

/// Result type alias for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
