//! Runtime configuration for the core services.
//!
//! All values have defaults matching the shipped app, so an empty JSON
//! object (or [`CoreConfig::default`]) is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Location tracking cadence and filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Update interval in normal mode (milliseconds).
    pub normal_interval_ms: u64,
    /// Update interval in emergency mode (milliseconds).
    pub emergency_interval_ms: u64,
    /// Readings closer than this to the last delivered one are dropped (meters).
    pub distance_filter_m: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            normal_interval_ms: 30_000,
            emergency_interval_ms: 1_000,
            distance_filter_m: 10.0,
        }
    }
}

impl TrackingConfig {
    /// Normal-mode cadence.
    #[must_use]
    pub const fn normal_interval(&self) -> Duration {
        Duration::from_millis(self.normal_interval_ms)
    }

    /// Emergency-mode cadence.
    #[must_use]
    pub const fn emergency_interval(&self) -> Duration {
        Duration::from_millis(self.emergency_interval_ms)
    }
}

/// Nearby-peer synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Number of synthetic peers generated around the user.
    pub nearby_user_count: usize,
    /// Radius peers are scattered within (kilometers).
    pub search_radius_km: f64,
    /// Radius an assistance alert reaches (meters).
    pub alert_radius_m: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            nearby_user_count: 8,
            search_radius_km: 2.0,
            alert_radius_m: 2_000.0,
        }
    }
}

/// Longest accepted alert retention window: one year, in minutes.
pub const MAX_RETENTION_MINUTES: i64 = 365 * 24 * 60;

/// Assistance alert delivery and retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Simulated delivery delay (milliseconds).
    pub delivery_delay_ms: u64,
    /// Alerts older than this are evicted by the sweep (minutes).
    pub retention_minutes: i64,
    /// Maximum length of the additional note (characters).
    pub max_note_chars: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            delivery_delay_ms: 1_000,
            retention_minutes: 30,
            max_note_chars: 200,
        }
    }
}

impl AlertConfig {
    /// Simulated delivery delay.
    #[must_use]
    pub const fn delivery_delay(&self) -> Duration {
        Duration::from_millis(self.delivery_delay_ms)
    }

    /// Retention window for the alert history.
    ///
    /// Saturates at [`chrono::Duration::MAX`] for values chrono cannot
    /// represent; [`CoreConfig::validate`] rejects those up front.
    #[must_use]
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.retention_minutes).unwrap_or(chrono::Duration::MAX)
    }
}

/// Top-level configuration for [`crate::AssistCore`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Location tracker settings.
    pub tracking: TrackingConfig,
    /// Proximity engine settings.
    pub proximity: ProximityConfig,
    /// Alert service settings.
    pub alerts: AlertConfig,
}

impl CoreConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracking.normal_interval_ms == 0 || self.tracking.emergency_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tracking intervals must be greater than zero".to_string(),
            ));
        }
        if !self.tracking.distance_filter_m.is_finite() || self.tracking.distance_filter_m < 0.0 {
            return Err(ConfigError::Invalid(
                "distance_filter_m must be a non-negative number".to_string(),
            ));
        }
        if !(self.proximity.search_radius_km.is_finite() && self.proximity.search_radius_km > 0.0)
        {
            return Err(ConfigError::Invalid(
                "search_radius_km must be positive".to_string(),
            ));
        }
        if !(self.proximity.alert_radius_m.is_finite() && self.proximity.alert_radius_m > 0.0) {
            return Err(ConfigError::Invalid(
                "alert_radius_m must be positive".to_string(),
            ));
        }
        if !(1..=MAX_RETENTION_MINUTES).contains(&self.alerts.retention_minutes) {
            return Err(ConfigError::Invalid(format!(
                "retention_minutes must be between 1 and {MAX_RETENTION_MINUTES}"
            )));
        }
        if self.alerts.max_note_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_note_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
