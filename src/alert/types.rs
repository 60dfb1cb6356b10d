//! Alert data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Kind of alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// Request for help from nearby users.
    Assistance,
    /// Alert to emergency contacts. Not delivered yet.
    Emergency,
}

impl AlertType {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assistance => "assistance",
            Self::Emergency => "emergency",
        }
    }
}

/// Lifecycle state of an alert. `Active` moves to `Resolved` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Still open.
    #[default]
    Active,
    /// Closed by the sender.
    Resolved,
}

impl AlertStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
        }
    }
}

/// An alert recorded in the local history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistanceAlert {
    /// Identifier, `alert_<unix-millis>_<sequence>`.
    pub id: String,
    /// Alert kind.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Where the sender was.
    pub location: Location,
    /// When the alert was sent.
    pub timestamp: DateTime<Utc>,
    /// Current lifecycle state.
    pub status: AlertStatus,
    /// Optional free-text note from the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_note: Option<String>,
    /// How many nearby users the alert reached.
    pub recipients_count: u32,
    /// When the alert was resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AssistanceAlert {
    /// Whether the alert is still open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}

/// Result of a send operation as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertOutcome {
    /// Whether the alert went out.
    pub success: bool,
    /// Human-readable status line.
    pub message: String,
    /// The recorded alert, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<AssistanceAlert>,
}
