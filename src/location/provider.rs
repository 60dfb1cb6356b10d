//! Platform location abstraction.
//!
//! This module defines the [`LocationProvider`] trait through which the
//! platform layer (iOS Core Location, Android Fused Location, ...) supplies
//! position fixes and permission state. Continuous watching is built on top
//! of [`LocationProvider::current_position`] by the tracker.

use super::error::LocationResult;
use super::types::{Location, PermissionStatus};

/// Trait for platform location services.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the tracker polls the provider
/// from a background tokio task.
///
/// # Example
///
/// ```ignore
/// use assist_core::location::{Location, LocationProvider, LocationResult, PermissionStatus};
///
/// struct PlatformLocation { /* ... */ }
///
/// impl LocationProvider for PlatformLocation {
///     fn current_position(&self) -> LocationResult<Location> {
///         // Ask the OS for a balanced-accuracy fix
///         todo!()
///     }
///     // ... other methods
/// }
/// ```
pub trait LocationProvider: Send + Sync {
    /// Resolves a single position fix.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Unavailable`](super::LocationError::Unavailable)
    /// if no fix can be obtained.
    fn current_position(&self) -> LocationResult<Location>;

    /// Current foreground permission state.
    fn permission_status(&self) -> PermissionStatus;

    /// Prompts the user for foreground location permission.
    fn request_permission(&self) -> PermissionStatus;

    /// Whether device-wide location services are switched on.
    fn services_enabled(&self) -> bool;

    /// Deep-links the user into the system location settings.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Settings`](super::LocationError::Settings)
    /// if the platform cannot open the settings screen.
    fn open_settings(&self) -> LocationResult<()>;
}
