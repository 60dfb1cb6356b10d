//! Error types for location operations.

use thiserror::Error;

/// Errors that can occur while acquiring or tracking the device location.
#[derive(Debug, Error)]
pub enum LocationError {
    /// Location permission has not been granted.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The platform could not resolve a position fix.
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    /// Device location services are switched off.
    #[error("Location services are disabled")]
    ServicesDisabled,

    /// Tracking was started outside of a tokio runtime.
    #[error("Location tracking requires a tokio runtime")]
    NoRuntime,

    /// Opening the system settings failed.
    #[error("Failed to open location settings: {0}")]
    Settings(String),
}

/// Result type for location operations.
pub type LocationResult<T> = Result<T, LocationError>;
