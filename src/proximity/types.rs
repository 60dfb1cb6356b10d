//! Nearby peer types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::privacy::{Gender, PrivacySettings};
use crate::location::geo::{haversine_km, location_to_geohash};

/// Gender assignment cycle for synthesized peers.
pub const GENDER_CYCLE: [Gender; 8] = [
    Gender::Woman,
    Gender::Man,
    Gender::Woman,
    Gender::Man,
    Gender::Woman,
    Gender::NonBinary,
    Gender::Man,
    Gender::Woman,
];

/// A peer near the user.
///
/// Ephemeral: regenerated for every tracking session and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyUser {
    /// Peer identifier.
    pub id: String,
    /// Peer gender category.
    pub gender: Gender,
    /// Peer latitude.
    pub latitude: f64,
    /// Peer longitude.
    pub longitude: f64,
    /// Whether the peer is currently online.
    pub is_online: bool,
    /// When the peer was last seen.
    pub last_seen: DateTime<Utc>,
    /// The peer's own privacy flags.
    pub privacy_settings: PrivacySettings,
}

impl NearbyUser {
    /// Distance from a coordinate, in kilometers.
    #[must_use]
    pub fn distance_km_from(&self, latitude: f64, longitude: f64) -> f64 {
        haversine_km(latitude, longitude, self.latitude, self.longitude)
    }

    /// Geohash cell of the peer at the given precision.
    #[must_use]
    pub fn geohash(&self, precision: u8) -> String {
        location_to_geohash(self.latitude, self.longitude, precision)
    }

    /// Whether a viewer of the given category may see this peer.
    #[must_use]
    pub const fn is_visible_to(&self, viewer: Gender) -> bool {
        self.privacy_settings.is_visible_to(viewer)
    }

    /// Whether a viewer of the given category may receive alerts from this peer.
    #[must_use]
    pub const fn can_alert(&self, viewer: Gender) -> bool {
        self.privacy_settings.accepts_requests_from(viewer)
    }
}
