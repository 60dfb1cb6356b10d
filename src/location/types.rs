//! Location data types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::{haversine_km, location_to_geohash, LOG_GEOHASH_PRECISION};
use crate::config::TrackingConfig;

/// A single position fix from the device.
///
/// Snapshots are immutable: every new reading produces a new `Location`
/// rather than mutating the previous one.
///
/// # Example
///
/// ```
/// use assist_core::location::Location;
///
/// let location = Location::new(37.7749, -122.4194, 12.0);
/// assert_eq!(location.latitude, 37.7749);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Horizontal accuracy radius in meters.
    pub accuracy: f64,
    /// When the fix was taken (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Location {
    /// Creates a fix timestamped now.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self::at(latitude, longitude, accuracy, Utc::now())
    }

    /// Creates a fix with an explicit timestamp.
    #[must_use]
    pub fn at(
        latitude: f64,
        longitude: f64,
        accuracy: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
        }
    }

    /// Returns whether both coordinates are finite and in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Distance to another fix in meters.
    #[must_use]
    pub fn distance_m(&self, other: &Self) -> f64 {
        haversine_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        ) * 1_000.0
    }

    /// Coarse geohash cell (~±2.4 km) safe to write to logs.
    #[must_use]
    pub fn coarse_cell(&self) -> String {
        location_to_geohash(self.latitude, self.longitude, LOG_GEOHASH_PRECISION)
    }
}

/// Tracking cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    /// Regular cadence (30 s by default).
    #[default]
    Normal,
    /// Fast cadence reserved for emergency escalation (1 s by default).
    Emergency,
}

impl TrackingMode {
    /// Converts to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Emergency => "emergency",
        }
    }

    /// Update interval for this mode under the given settings.
    #[must_use]
    pub const fn interval(self, config: &TrackingConfig) -> Duration {
        match self {
            Self::Normal => config.normal_interval(),
            Self::Emergency => config.emergency_interval(),
        }
    }
}

/// Foreground location permission state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user granted access.
    Granted,
    /// The user refused access.
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

impl PermissionStatus {
    /// Returns whether location may be read.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}
