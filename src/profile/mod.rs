//! User profile module.
//!
//! Owns the single local profile: gender category, privacy flags and
//! onboarding state. The document is stored as versioned JSON under the
//! `userProfile` key of a [`KeyValueStore`](crate::storage::KeyValueStore).
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use assist_core::profile::ProfileStore;
//! use assist_core::proximity::{Gender, PrivacySettings};
//! use assist_core::storage::MemoryStore;
//!
//! let profiles = ProfileStore::new(Arc::new(MemoryStore::new()));
//! let profile = profiles
//!     .create_user_profile(Gender::Woman, PrivacySettings::default())
//!     .unwrap();
//!
//! assert!(profile.user_id.starts_with("user_"));
//! assert!(profiles.has_completed_onboarding().unwrap());
//! ```

mod error;
pub mod schema;
mod store;
mod types;

pub use error::{ProfileError, Result};
pub use store::ProfileStore;
pub use types::{ProfileUpdate, UserProfile};
