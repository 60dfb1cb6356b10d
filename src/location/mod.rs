//! Location module.
//!
//! Provides device location acquisition and continuous tracking:
//! - One-shot fixes with permission and availability checks
//! - A single live tracking subscription with normal/emergency cadence
//! - Minimum-distance filtering of streamed readings
//! - Geodesic helpers (haversine distance, area-uniform disc sampling)
//!
//! # Privacy
//!
//! Raw coordinates are never written to logs. Log events carry a coarse
//! geohash cell (see [`Location::coarse_cell`]) instead.
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use assist_core::config::TrackingConfig;
//! use assist_core::location::{LocationTracker, SimulatedProvider};
//!
//! let provider = Arc::new(SimulatedProvider::with_seed(37.7749, -122.4194, 42));
//! let tracker = LocationTracker::new(provider, TrackingConfig::default());
//!
//! let fix = tracker.current_location().unwrap();
//! assert_eq!(tracker.last_location(), Some(fix));
//! ```

mod error;
pub mod geo;
mod provider;
mod simulated;
mod tracker;
mod types;

pub use error::{LocationError, LocationResult};
pub use provider::LocationProvider;
pub use simulated::SimulatedProvider;
pub use tracker::{LocationCallback, LocationTracker};
pub use types::{Location, PermissionStatus, TrackingMode};
