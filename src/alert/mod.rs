//! Assistance alerts.
//!
//! A user in trouble broadcasts an assistance request to nearby peers. The
//! [`AlertService`] records each request in a local history, tracks its
//! active/resolved state, and sweeps expired entries on demand.
//!
//! Delivery is simulated for now (fixed delay, random recipient count);
//! emergency-contact alerts are an extension point that always reports
//! failure.

mod error;
mod service;
mod types;

pub use error::{AlertError, Result};
pub use service::AlertService;
pub use types::{AlertOutcome, AlertStatus, AlertType, AssistanceAlert};
