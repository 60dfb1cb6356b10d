//! Simulated location provider.
//!
//! Produces a random walk around a starting point. Used by the `assist-sim`
//! binary and by tests; permission and availability can be toggled to
//! exercise the error paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::{LocationError, LocationResult};
use super::geo::random_point_within;
use super::provider::LocationProvider;
use super::types::{Location, PermissionStatus};

/// Default distance moved between two readings (meters).
const DEFAULT_STEP_M: f64 = 25.0;

/// Reported accuracy of simulated fixes (meters).
const SIMULATED_ACCURACY_M: f64 = 8.0;

struct WalkState {
    latitude: f64,
    longitude: f64,
    rng: StdRng,
}

/// A [`LocationProvider`] that random-walks from a starting coordinate.
pub struct SimulatedProvider {
    walk: Mutex<WalkState>,
    step_m: f64,
    granted: AtomicBool,
    services_enabled: AtomicBool,
    available: AtomicBool,
}

impl SimulatedProvider {
    /// Creates a provider starting at the given coordinate, with permission
    /// granted and services enabled.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_rng(latitude, longitude, StdRng::from_entropy())
    }

    /// Creates a provider with a deterministic walk.
    #[must_use]
    pub fn with_seed(latitude: f64, longitude: f64, seed: u64) -> Self {
        Self::with_rng(latitude, longitude, StdRng::seed_from_u64(seed))
    }

    fn with_rng(latitude: f64, longitude: f64, rng: StdRng) -> Self {
        Self {
            walk: Mutex::new(WalkState {
                latitude,
                longitude,
                rng,
            }),
            step_m: DEFAULT_STEP_M,
            granted: AtomicBool::new(true),
            services_enabled: AtomicBool::new(true),
            available: AtomicBool::new(true),
        }
    }

    /// Sets the distance moved per reading. Zero keeps the position fixed.
    #[must_use]
    pub fn with_step(mut self, step_m: f64) -> Self {
        self.step_m = step_m.max(0.0);
        self
    }

    /// Grants or revokes location permission.
    pub fn set_permission_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    /// Switches device location services on or off.
    pub fn set_services_enabled(&self, enabled: bool) {
        self.services_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Makes subsequent fixes fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl LocationProvider for SimulatedProvider {
    fn current_position(&self) -> LocationResult<Location> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(LocationError::Unavailable(
                "simulated provider has no fix".to_string(),
            ));
        }

        let mut walk = self.walk.lock().unwrap_or_else(PoisonError::into_inner);
        if self.step_m > 0.0 {
            let WalkState {
                latitude,
                longitude,
                rng,
            } = &mut *walk;
            let (lat, lon) = random_point_within(rng, *latitude, *longitude, self.step_m / 1_000.0);
            *latitude = lat;
            *longitude = lon;
        }

        Ok(Location::new(
            walk.latitude,
            walk.longitude,
            SIMULATED_ACCURACY_M,
        ))
    }

    fn permission_status(&self) -> PermissionStatus {
        if self.granted.load(Ordering::SeqCst) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    fn request_permission(&self) -> PermissionStatus {
        self.permission_status()
    }

    fn services_enabled(&self) -> bool {
        self.services_enabled.load(Ordering::SeqCst)
    }

    fn open_settings(&self) -> LocationResult<()> {
        Err(LocationError::Settings(
            "simulated provider has no settings screen".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_stays_near_start() {
        let provider = SimulatedProvider::with_seed(37.7749, -122.4194, 3);
        let start = Location::new(37.7749, -122.4194, 0.0);

        for _ in 0..10 {
            let fix = provider.current_position().unwrap();
            // 10 steps of at most 25 m each
            assert!(start.distance_m(&fix) <= 250.0);
        }
    }

    #[test]
    fn zero_step_keeps_position() {
        let provider = SimulatedProvider::with_seed(1.0, 2.0, 3).with_step(0.0);
        let fix = provider.current_position().unwrap();

        assert!((fix.latitude - 1.0).abs() < f64::EPSILON);
        assert!((fix.longitude - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unavailable_provider_fails() {
        let provider = SimulatedProvider::with_seed(0.0, 0.0, 1);
        provider.set_available(false);

        assert!(matches!(
            provider.current_position(),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[test]
    fn permission_toggle() {
        let provider = SimulatedProvider::with_seed(0.0, 0.0, 1);
        assert_eq!(provider.permission_status(), PermissionStatus::Granted);

        provider.set_permission_granted(false);
        assert_eq!(provider.request_permission(), PermissionStatus::Denied);
    }

    #[test]
    fn open_settings_is_unsupported() {
        let provider = SimulatedProvider::with_seed(0.0, 0.0, 1);
        assert!(matches!(
            provider.open_settings(),
            Err(LocationError::Settings(_))
        ));
    }
}
