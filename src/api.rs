//! Composition root tying the services together.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::alert::{AlertError, AlertOutcome, AlertService};
use crate::config::{ConfigError, CoreConfig};
use crate::location::{Location, LocationError, LocationProvider, LocationTracker};
use crate::profile::{ProfileError, ProfileStore};
use crate::proximity::{NearbyUser, ProximityEngine};
use crate::storage::{KeyValueStore, StorageError};

/// Error type for flows that span several services.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Location acquisition or tracking failed.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Profile read or write failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Alert could not be sent.
    #[error(transparent)]
    Alert(#[from] AlertError),

    /// Raw storage access failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for [`AssistCore`] operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Application context owning every service.
///
/// Platform code supplies a [`LocationProvider`] and a [`KeyValueStore`];
/// everything else is created here from the [`CoreConfig`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use assist_core::location::SimulatedProvider;
/// use assist_core::storage::MemoryStore;
/// use assist_core::{AssistCore, CoreConfig};
///
/// let core = AssistCore::new(
///     CoreConfig::default(),
///     Arc::new(SimulatedProvider::with_seed(40.4168, -3.7038, 1)),
///     Arc::new(MemoryStore::new()),
/// )
/// .unwrap();
///
/// let count = core.refresh_nearby_count().unwrap();
/// assert!((3..=8).contains(&count));
/// ```
pub struct AssistCore {
    config: CoreConfig,
    tracker: LocationTracker,
    proximity: Arc<ProximityEngine>,
    alerts: AlertService,
    profiles: ProfileStore,
    nearby_count: Arc<AtomicU32>,
}

impl AssistCore {
    /// Validates the configuration and wires up the services.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the configuration is invalid.
    pub fn new(
        config: CoreConfig,
        provider: Arc<dyn LocationProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        config.validate()?;
        let proximity = ProximityEngine::new(config.proximity.clone());
        let alerts = AlertService::new(config.alerts.clone());
        Ok(Self::assemble(config, provider, store, proximity, alerts))
    }

    /// Like [`new`](Self::new) but with reproducible random streams.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the configuration is invalid.
    pub fn with_seed(
        config: CoreConfig,
        provider: Arc<dyn LocationProvider>,
        store: Arc<dyn KeyValueStore>,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        let proximity = ProximityEngine::with_seed(config.proximity.clone(), seed);
        let alerts = AlertService::with_seed(config.alerts.clone(), seed.wrapping_add(1));
        Ok(Self::assemble(config, provider, store, proximity, alerts))
    }

    fn assemble(
        config: CoreConfig,
        provider: Arc<dyn LocationProvider>,
        store: Arc<dyn KeyValueStore>,
        proximity: ProximityEngine,
        alerts: AlertService,
    ) -> Self {
        Self {
            tracker: LocationTracker::new(provider, config.tracking.clone()),
            proximity: Arc::new(proximity),
            alerts,
            profiles: ProfileStore::new(store),
            nearby_count: Arc::new(AtomicU32::new(0)),
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Location tracker.
    #[must_use]
    pub const fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    /// Proximity engine.
    #[must_use]
    pub fn proximity(&self) -> &ProximityEngine {
        &self.proximity
    }

    /// Alert service.
    #[must_use]
    pub const fn alerts(&self) -> &AlertService {
        &self.alerts
    }

    /// Profile store.
    #[must_use]
    pub const fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// Starts tracking and recounts nearby users on every delivered fix.
    ///
    /// # Errors
    ///
    /// Propagates [`LocationTracker::start_tracking`] errors.
    pub fn start_monitoring(&self) -> Result<()> {
        let proximity = Arc::clone(&self.proximity);
        let nearby_count = Arc::clone(&self.nearby_count);

        self.tracker.start_tracking(move |fix| {
            let count = proximity.count_nearby_default(fix.latitude, fix.longitude);
            nearby_count.store(count, Ordering::Relaxed);
        })?;
        Ok(())
    }

    /// Stops tracking. The last nearby count is kept.
    pub fn stop_monitoring(&self) {
        self.tracker.stop_tracking();
    }

    /// Nearby count from the most recent fix, `0` before the first one.
    #[must_use]
    pub fn nearby_count(&self) -> u32 {
        self.nearby_count.load(Ordering::Relaxed)
    }

    /// Takes a fresh fix and recounts nearby users.
    ///
    /// # Errors
    ///
    /// Propagates [`LocationTracker::current_location`] errors.
    pub fn refresh_nearby_count(&self) -> Result<u32> {
        let fix = self.tracker.current_location()?;
        let count = self
            .proximity
            .count_nearby_default(fix.latitude, fix.longitude);
        self.nearby_count.store(count, Ordering::Relaxed);
        Ok(count)
    }

    /// Sends an assistance request from the last known location, taking a
    /// fresh fix if none is cached.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Location`] if no location can be obtained
    /// - [`CoreError::Alert`] if the note is too long
    pub async fn request_assistance(&self, note: Option<&str>) -> Result<AlertOutcome> {
        let location = self.best_location()?;
        Ok(self
            .alerts
            .send_assistance_request(&location, note)
            .await?)
    }

    /// Nearby peers visible to the local user, by profile gender.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Profile`] with [`ProfileError::NotFound`] before
    ///   onboarding
    /// - [`CoreError::Location`] if no location can be obtained
    pub fn nearby_users_for_profile(&self) -> Result<Vec<NearbyUser>> {
        let viewer = self.profiles.gender()?.ok_or(ProfileError::NotFound)?;
        let location = self.best_location()?;
        Ok(self
            .proximity
            .nearby_for_viewer(location.latitude, location.longitude, viewer))
    }

    fn best_location(&self) -> Result<Location> {
        match self.tracker.last_location() {
            Some(location) => Ok(location),
            None => Ok(self.tracker.current_location()?),
        }
    }

    /// Snapshot of internal state for diagnostics screens.
    #[cfg(feature = "debug-tools")]
    #[must_use]
    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            is_tracking: self.tracker.is_tracking(),
            tracking_mode: self.tracker.tracking_mode(),
            last_cell: self.tracker.last_location().map(|l| l.coarse_cell()),
            nearby_count: self.nearby_count(),
            active_alerts: self.alerts.active_alerts().len(),
            retained_alerts: self.alerts.alert_history().len(),
        }
    }
}

/// Diagnostics snapshot. Carries no raw coordinates.
#[cfg(feature = "debug-tools")]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// Whether a tracking subscription is live.
    pub is_tracking: bool,
    /// Current tracking cadence.
    pub tracking_mode: crate::location::TrackingMode,
    /// Coarse geohash cell of the last fix.
    pub last_cell: Option<String>,
    /// Last nearby count.
    pub nearby_count: u32,
    /// Alerts still active.
    pub active_alerts: usize,
    /// Alerts in the history.
    pub retained_alerts: usize,
}
