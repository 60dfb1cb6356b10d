//! Continuous location tracking.
//!
//! The [`LocationTracker`] owns at most one live subscription: a tokio task
//! that polls the [`LocationProvider`] at the cadence of the current
//! [`TrackingMode`] and hands each accepted fix to a callback. Starting a new
//! subscription cancels the previous one (last writer wins).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::error::{LocationError, LocationResult};
use super::provider::LocationProvider;
use super::types::{Location, PermissionStatus, TrackingMode};
use crate::config::TrackingConfig;

/// Callback invoked with every delivered fix.
pub type LocationCallback = Arc<dyn Fn(Location) + Send + Sync>;

#[derive(Default)]
struct TrackerState {
    mode: TrackingMode,
    subscription: Option<JoinHandle<()>>,
    callback: Option<LocationCallback>,
    last_location: Option<Location>,
}

/// Streams the device location to a callback.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use assist_core::config::TrackingConfig;
/// use assist_core::location::{LocationTracker, SimulatedProvider};
///
/// # async fn run() -> Result<(), assist_core::location::LocationError> {
/// let provider = Arc::new(SimulatedProvider::new(37.7749, -122.4194));
/// let tracker = LocationTracker::new(provider, TrackingConfig::default());
///
/// tracker.start_tracking(|fix| println!("moved to cell {}", fix.coarse_cell()))?;
/// // ...
/// tracker.stop_tracking();
/// # Ok(())
/// # }
/// ```
pub struct LocationTracker {
    provider: Arc<dyn LocationProvider>,
    config: TrackingConfig,
    state: Arc<Mutex<TrackerState>>,
}

impl LocationTracker {
    /// Creates an idle tracker in normal mode.
    #[must_use]
    pub fn new(provider: Arc<dyn LocationProvider>, config: TrackingConfig) -> Self {
        Self {
            provider,
            config,
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_permission(&self) -> LocationResult<()> {
        if self.provider.permission_status().is_granted() {
            Ok(())
        } else {
            Err(LocationError::PermissionDenied)
        }
    }

    /// Resolves a single fix and caches it as the last known location.
    ///
    /// # Errors
    ///
    /// - [`LocationError::PermissionDenied`] if permission is not granted
    /// - [`LocationError::ServicesDisabled`] if location services are off
    /// - [`LocationError::Unavailable`] if no valid fix can be obtained
    pub fn current_location(&self) -> LocationResult<Location> {
        self.ensure_permission()?;
        if !self.provider.services_enabled() {
            return Err(LocationError::ServicesDisabled);
        }

        let fix = self.provider.current_position()?;
        if !fix.is_valid() {
            return Err(LocationError::Unavailable(
                "provider returned out-of-range coordinates".to_string(),
            ));
        }

        tracing::debug!(
            cell = %fix.coarse_cell(),
            accuracy = fix.accuracy,
            "Location fix acquired"
        );
        self.state().last_location = Some(fix.clone());
        Ok(fix)
    }

    /// Starts a continuous subscription, replacing any active one.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`LocationError::PermissionDenied`] if permission is not granted
    /// - [`LocationError::NoRuntime`] outside of a tokio runtime
    pub fn start_tracking<F>(&self, on_update: F) -> LocationResult<()>
    where
        F: Fn(Location) + Send + Sync + 'static,
    {
        self.start_with(Arc::new(on_update))
    }

    fn start_with(&self, callback: LocationCallback) -> LocationResult<()> {
        self.ensure_permission()?;
        let runtime = Handle::try_current().map_err(|_| LocationError::NoRuntime)?;

        let mut state = self.state();
        self.respawn(&mut state, &runtime, callback);
        Ok(())
    }

    /// Replaces the subscription task. Callers hold the state lock, so no
    /// other start or stop can interleave.
    fn respawn(&self, state: &mut TrackerState, runtime: &Handle, callback: LocationCallback) {
        if let Some(previous) = state.subscription.take() {
            previous.abort();
        }

        let mode = state.mode;
        let interval = mode.interval(&self.config);
        let task = runtime.spawn(watch_position(
            Arc::clone(&self.provider),
            Arc::clone(&self.state),
            Arc::clone(&callback),
            interval,
            self.config.distance_filter_m,
        ));

        state.subscription = Some(task);
        state.callback = Some(callback);

        tracing::debug!(mode = mode.as_str(), ?interval, "Location tracking started");
    }

    /// Cancels the active subscription. Calling it while idle is a no-op.
    pub fn stop_tracking(&self) {
        let mut state = self.state();
        state.callback = None;
        if let Some(subscription) = state.subscription.take() {
            subscription.abort();
            drop(state);
            tracing::debug!("Location tracking stopped");
        }
    }

    /// Switches the tracking cadence.
    ///
    /// If a subscription is active it is restarted with the new interval and
    /// the same callback. The mode only changes when the restart succeeds;
    /// on error the running subscription and the previous mode are kept.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`start_tracking`](Self::start_tracking) when
    /// a restart is needed.
    pub fn set_tracking_mode(&self, mode: TrackingMode) -> LocationResult<()> {
        let mut state = self.state();
        let live_callback = if state.subscription.is_some() {
            state.callback.clone()
        } else {
            None
        };
        let Some(callback) = live_callback else {
            state.mode = mode;
            return Ok(());
        };

        self.ensure_permission()?;
        let runtime = Handle::try_current().map_err(|_| LocationError::NoRuntime)?;

        state.mode = mode;
        self.respawn(&mut state, &runtime, callback);
        Ok(())
    }

    /// Current tracking cadence.
    #[must_use]
    pub fn tracking_mode(&self) -> TrackingMode {
        self.state().mode
    }

    /// Last fix obtained by either a one-shot read or the subscription.
    #[must_use]
    pub fn last_location(&self) -> Option<Location> {
        self.state().last_location.clone()
    }

    /// Whether a subscription is live.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state().subscription.is_some()
    }

    /// Whether device location services are switched on.
    #[must_use]
    pub fn is_location_enabled(&self) -> bool {
        self.provider.services_enabled()
    }

    /// Current permission state, without prompting.
    #[must_use]
    pub fn check_permission(&self) -> PermissionStatus {
        self.provider.permission_status()
    }

    /// Prompts the user for permission.
    #[must_use]
    pub fn request_permission(&self) -> PermissionStatus {
        let status = self.provider.request_permission();
        if !status.is_granted() {
            tracing::info!(?status, "Location permission not granted");
        }
        status
    }

    /// Sends the user to the system settings to grant permission manually.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Settings`] if the platform cannot open them.
    pub fn open_settings(&self) -> LocationResult<()> {
        self.provider.open_settings()
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}

/// Subscription loop: polls the provider, drops readings inside the
/// distance filter, records and delivers the rest.
async fn watch_position(
    provider: Arc<dyn LocationProvider>,
    state: Arc<Mutex<TrackerState>>,
    callback: LocationCallback,
    interval: std::time::Duration,
    distance_filter_m: f64,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_delivered: Option<Location> = None;

    loop {
        ticker.tick().await;

        let fix = match provider.current_position() {
            Ok(fix) if fix.is_valid() => fix,
            Ok(_) => {
                tracing::warn!("Skipping location reading with out-of-range coordinates");
                continue;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping failed location reading");
                continue;
            }
        };

        if let Some(previous) = &last_delivered {
            if previous.distance_m(&fix) < distance_filter_m {
                continue;
            }
        }

        state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_location = Some(fix.clone());
        last_delivered = Some(fix.clone());
        callback(fix);
    }
}
