//! Nearby-peer synthesis and privacy filtering.
//!
//! There is no peer registry yet: peers are scattered around the user at
//! random. A real deployment replaces [`ProximityEngine::generate_nearby_users`]
//! and [`ProximityEngine::count_nearby`] with a spatial-index query (geohash
//! prefix or R-tree) against live peers; the filtering functions stay as-is.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::privacy::{Gender, PrivacySettings};
use super::types::{NearbyUser, GENDER_CYCLE};
use crate::config::ProximityConfig;
use crate::location::geo::{location_to_geohash, random_point_within, LOG_GEOHASH_PRECISION};

/// Lower bound of the simulated nearby count.
pub const MIN_NEARBY_COUNT: u32 = 3;

/// Upper bound (inclusive) of the simulated nearby count.
pub const MAX_NEARBY_COUNT: u32 = 8;

/// Computes which peers are near a location.
pub struct ProximityEngine {
    config: ProximityConfig,
    rng: Mutex<StdRng>,
}

impl ProximityEngine {
    /// Creates an engine seeded from system entropy.
    #[must_use]
    pub fn new(config: ProximityConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates an engine with a reproducible random stream.
    #[must_use]
    pub fn with_seed(config: ProximityConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Engine settings.
    #[must_use]
    pub const fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Synthesizes the configured number of peers within the search radius.
    #[must_use]
    pub fn generate_nearby_users(&self, latitude: f64, longitude: f64) -> Vec<NearbyUser> {
        self.generate_within(latitude, longitude, self.config.search_radius_km)
    }

    /// Synthesizes the configured number of peers within `radius_km`.
    ///
    /// Positions are area-uniform inside the disc; genders follow
    /// [`GENDER_CYCLE`]; every peer is online with default privacy flags.
    #[must_use]
    pub fn generate_within(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Vec<NearbyUser> {
        let now = Utc::now();
        let mut rng = self.rng();

        (0..self.config.nearby_user_count)
            .map(|i| {
                let (lat, lon) = random_point_within(&mut *rng, latitude, longitude, radius_km);
                NearbyUser {
                    id: format!("mock_{}", i + 1),
                    gender: GENDER_CYCLE[i % GENDER_CYCLE.len()],
                    latitude: lat,
                    longitude: lon,
                    is_online: true,
                    last_seen: now,
                    privacy_settings: PrivacySettings::default(),
                }
            })
            .collect()
    }

    /// Approximate number of peers an alert at this point would reach.
    ///
    /// Without a backend this is a uniform draw in
    /// [`MIN_NEARBY_COUNT`]..=[`MAX_NEARBY_COUNT`].
    #[must_use]
    pub fn count_nearby(&self, latitude: f64, longitude: f64, radius_m: f64) -> u32 {
        let count = self.rng().gen_range(MIN_NEARBY_COUNT..=MAX_NEARBY_COUNT);
        tracing::debug!(
            cell = %location_to_geohash(latitude, longitude, LOG_GEOHASH_PRECISION),
            radius_m,
            count,
            "Nearby users counted"
        );
        count
    }

    /// [`count_nearby`](Self::count_nearby) with the configured alert radius.
    #[must_use]
    pub fn count_nearby_default(&self, latitude: f64, longitude: f64) -> u32 {
        self.count_nearby(latitude, longitude, self.config.alert_radius_m)
    }

    /// Synthesizes peers and keeps those visible to the viewer.
    #[must_use]
    pub fn nearby_for_viewer(
        &self,
        latitude: f64,
        longitude: f64,
        viewer: Gender,
    ) -> Vec<NearbyUser> {
        visible_peers(&self.generate_nearby_users(latitude, longitude), viewer)
    }
}

/// Peers whose `visibleTo<viewer>` flag is set.
#[must_use]
pub fn visible_peers(peers: &[NearbyUser], viewer: Gender) -> Vec<NearbyUser> {
    peers
        .iter()
        .filter(|peer| peer.is_visible_to(viewer))
        .cloned()
        .collect()
}

/// Peers whose `canReceiveRequestsFrom<viewer>` flag is set.
#[must_use]
pub fn reachable_peers(peers: &[NearbyUser], viewer: Gender) -> Vec<NearbyUser> {
    peers
        .iter()
        .filter(|peer| peer.can_alert(viewer))
        .cloned()
        .collect()
}

/// Peers passing both the visibility and the request check.
#[must_use]
pub fn interactable_peers(peers: &[NearbyUser], viewer: Gender) -> Vec<NearbyUser> {
    peers
        .iter()
        .filter(|peer| peer.is_visible_to(viewer) && peer.can_alert(viewer))
        .cloned()
        .collect()
}
