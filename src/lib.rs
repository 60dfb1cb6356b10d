//! Assist Core Library
//!
//! Core functionality for a safety-assistance app: users share their location,
//! see nearby peers filtered by privacy settings, and broadcast assistance
//! requests. UI, map rendering and platform APIs live outside this crate and
//! plug in through the [`location::LocationProvider`] and
//! [`storage::KeyValueStore`] traits.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod alert;
pub mod config;
pub mod location;
pub mod profile;
pub mod proximity;
pub mod storage;

pub use api::{AssistCore, CoreError};
#[cfg(feature = "debug-tools")]
pub use api::DebugInfo;
pub use config::CoreConfig;
