//! Proximity engine.
//!
//! Determines which peers are near a location and which of them a viewer
//! may see or exchange assistance requests with.
//!
//! # Privacy Model
//!
//! Two independent checks, both driven by the *peer's* settings and the
//! *viewer's* gender category:
//!
//! | Check      | Peer flag                          |
//! |------------|------------------------------------|
//! | Visibility | `visibleTo<ViewerGender>`          |
//! | Requests   | `canReceiveRequestsFrom<ViewerGender>` |
//!
//! Mutual interaction requires both.

mod engine;
mod privacy;
mod types;

pub use engine::{
    interactable_peers, reachable_peers, visible_peers, ProximityEngine, MAX_NEARBY_COUNT,
    MIN_NEARBY_COUNT,
};
pub use privacy::{Gender, PrivacySettings};
pub use types::{NearbyUser, GENDER_CYCLE};
