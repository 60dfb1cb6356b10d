//! Error types for alert operations.

use thiserror::Error;

/// Error type for alert operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    /// The free-text note exceeds the configured limit.
    #[error("Note too long: {len} characters (max {max})")]
    NoteTooLong {
        /// Length of the rejected note, in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Result type alias for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;
