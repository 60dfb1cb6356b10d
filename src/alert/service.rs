//! Assistance alert lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::{AlertError, Result};
use super::types::{AlertOutcome, AlertStatus, AlertType, AssistanceAlert};
use crate::config::AlertConfig;
use crate::location::Location;
use crate::proximity::{MAX_NEARBY_COUNT, MIN_NEARBY_COUNT};

const EMERGENCY_UNAVAILABLE: &str = "Emergency alerts not yet implemented";

/// Sends assistance requests and keeps the local alert history.
///
/// Delivery is simulated: a fixed delay followed by a random recipient
/// count. The history is unbounded until [`clear_old_alerts`] is called.
///
/// [`clear_old_alerts`]: AlertService::clear_old_alerts
pub struct AlertService {
    config: AlertConfig,
    history: Mutex<Vec<AssistanceAlert>>,
    rng: Mutex<StdRng>,
    seq: AtomicU64,
}

impl AlertService {
    /// Creates a service seeded from system entropy.
    #[must_use]
    pub fn new(config: AlertConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a service with a reproducible recipient stream.
    #[must_use]
    pub fn with_seed(config: AlertConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: AlertConfig, rng: StdRng) -> Self {
        Self {
            config,
            history: Mutex::new(Vec::new()),
            rng: Mutex::new(rng),
            seq: AtomicU64::new(0),
        }
    }

    fn history(&self) -> MutexGuard<'_, Vec<AssistanceAlert>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcasts an assistance request from `location`.
    ///
    /// Waits for the simulated delivery delay, then records an active
    /// alert. There is no timeout and no cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NoteTooLong`] before any delay if the note
    /// exceeds the configured character limit.
    pub async fn send_assistance_request(
        &self,
        location: &Location,
        note: Option<&str>,
    ) -> Result<AlertOutcome> {
        if let Some(note) = note {
            let len = note.chars().count();
            if len > self.config.max_note_chars {
                return Err(AlertError::NoteTooLong {
                    len,
                    max: self.config.max_note_chars,
                });
            }
        }

        tokio::time::sleep(self.config.delivery_delay()).await;

        let recipients_count = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(MIN_NEARBY_COUNT..=MAX_NEARBY_COUNT);
        let timestamp = Utc::now();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;

        let alert = AssistanceAlert {
            id: format!("alert_{}_{seq}", timestamp.timestamp_millis()),
            alert_type: AlertType::Assistance,
            location: location.clone(),
            timestamp,
            status: AlertStatus::Active,
            additional_note: note.map(str::to_string),
            recipients_count,
            resolved_at: None,
        };

        self.history().push(alert.clone());
        tracing::info!(
            alert_id = %alert.id,
            cell = %location.coarse_cell(),
            recipients = recipients_count,
            has_note = alert.additional_note.is_some(),
            "Assistance request sent"
        );

        Ok(AlertOutcome {
            success: true,
            message: format!("Alert sent to {recipients_count} nearby users"),
            alert: Some(alert),
        })
    }

    /// Marks an active alert as resolved.
    ///
    /// Returns `false` (and changes nothing) for unknown ids and for alerts
    /// that are already resolved.
    pub fn resolve_alert(&self, alert_id: &str) -> bool {
        let mut history = self.history();
        let Some(alert) = history
            .iter_mut()
            .find(|a| a.id == alert_id && a.is_active())
        else {
            tracing::debug!(alert_id, "No active alert to resolve");
            return false;
        };

        alert.status = AlertStatus::Resolved;
        alert.resolved_at = Some(Utc::now());
        tracing::info!(alert_id, "Alert resolved");
        true
    }

    /// Active alerts, oldest first.
    #[must_use]
    pub fn active_alerts(&self) -> Vec<AssistanceAlert> {
        self.history()
            .iter()
            .filter(|a| a.is_active())
            .cloned()
            .collect()
    }

    /// Every retained alert regardless of status, oldest first.
    #[must_use]
    pub fn alert_history(&self) -> Vec<AssistanceAlert> {
        self.history().clone()
    }

    /// Evicts alerts older than the retention window. Returns how many were
    /// removed.
    pub fn clear_old_alerts(&self) -> usize {
        self.clear_alerts_older_than(Utc::now())
    }

    /// Evicts alerts whose timestamp is at or before `now - retention`.
    /// Returns how many were removed.
    pub fn clear_alerts_older_than(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now
            .checked_sub_signed(self.config.retention())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut history = self.history();
        let before = history.len();
        history.retain(|a| a.timestamp > cutoff);
        let removed = before - history.len();

        if removed > 0 {
            tracing::debug!(removed, remaining = history.len(), "Old alerts cleared");
        }
        removed
    }

    /// Alerts emergency contacts. Not available yet; always reports failure
    /// and records nothing.
    #[must_use]
    pub fn send_emergency_alert(&self, location: &Location, contacts: &[String]) -> AlertOutcome {
        tracing::warn!(
            cell = %location.coarse_cell(),
            contacts = contacts.len(),
            "Emergency alert requested but not available"
        );
        AlertOutcome {
            success: false,
            message: EMERGENCY_UNAVAILABLE.to_string(),
            alert: None,
        }
    }

    #[cfg(test)]
    fn insert_alert(&self, alert: AssistanceAlert) {
        self.history().push(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn here() -> Location {
        Location::new(51.5074, -0.1278, 5.0)
    }

    fn service() -> AlertService {
        AlertService::with_seed(AlertConfig::default(), 11)
    }

    fn alert_at(id: &str, timestamp: DateTime<Utc>) -> AssistanceAlert {
        AssistanceAlert {
            id: id.to_string(),
            alert_type: AlertType::Assistance,
            location: here(),
            timestamp,
            status: AlertStatus::Active,
            additional_note: None,
            recipients_count: 3,
            resolved_at: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn send_records_active_alert() {
        let alerts = service();
        let outcome = alerts
            .send_assistance_request(&here(), Some("need help"))
            .await
            .unwrap();

        assert!(outcome.success);
        let alert = outcome.alert.unwrap();
        assert!((MIN_NEARBY_COUNT..=MAX_NEARBY_COUNT).contains(&alert.recipients_count));
        assert_eq!(
            outcome.message,
            format!("Alert sent to {} nearby users", alert.recipients_count)
        );
        assert_eq!(alert.additional_note.as_deref(), Some("need help"));
        assert!(alert.id.starts_with("alert_"));
        assert_eq!(alerts.active_alerts(), vec![alert]);
    }

    #[tokio::test(start_paused = true)]
    async fn send_waits_for_delivery_delay() {
        let alerts = service();
        let start = tokio::time::Instant::now();

        alerts.send_assistance_request(&here(), None).await.unwrap();

        assert!(start.elapsed() >= AlertConfig::default().delivery_delay());
    }

    #[tokio::test(start_paused = true)]
    async fn note_limit_counts_characters() {
        let alerts = service();
        let at_limit = "é".repeat(200);
        assert!(alerts
            .send_assistance_request(&here(), Some(&at_limit))
            .await
            .is_ok());

        let over = "a".repeat(201);
        let err = alerts
            .send_assistance_request(&here(), Some(&over))
            .await
            .unwrap_err();
        assert_eq!(err, AlertError::NoteTooLong { len: 201, max: 200 });
        assert_eq!(alerts.alert_history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ids_are_unique() {
        let alerts = service();
        let a = alerts.send_assistance_request(&here(), None).await.unwrap();
        let b = alerts.send_assistance_request(&here(), None).await.unwrap();
        assert_ne!(a.alert.unwrap().id, b.alert.unwrap().id);
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_transitions_once() {
        let alerts = service();
        let first = alerts
            .send_assistance_request(&here(), None)
            .await
            .unwrap()
            .alert
            .unwrap();
        let second = alerts
            .send_assistance_request(&here(), None)
            .await
            .unwrap()
            .alert
            .unwrap();

        assert!(alerts.resolve_alert(&first.id));
        assert!(!alerts.resolve_alert(&first.id));

        let active = alerts.active_alerts();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        let history = alerts.alert_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, AlertStatus::Resolved);
        assert!(history[0].resolved_at.is_some());
    }

    #[test]
    fn resolve_unknown_is_noop() {
        let alerts = service();
        alerts.insert_alert(alert_at("alert_1_1", Utc::now()));

        assert!(!alerts.resolve_alert("alert_missing"));
        assert_eq!(alerts.active_alerts().len(), 1);
    }

    #[test]
    fn clear_evicts_only_expired() {
        let alerts = service();
        let now = Utc::now();
        alerts.insert_alert(alert_at("old", now - Duration::minutes(45)));
        alerts.insert_alert(alert_at("boundary", now - Duration::minutes(30)));
        alerts.insert_alert(alert_at("recent", now - Duration::minutes(29)));
        alerts.insert_alert(alert_at("fresh", now));

        let removed = alerts.clear_alerts_older_than(now);

        assert_eq!(removed, 2);
        let ids: Vec<String> = alerts.alert_history().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["recent", "fresh"]);
    }

    #[test]
    fn clear_removes_resolved_alerts_too() {
        let alerts = service();
        let now = Utc::now();
        alerts.insert_alert(alert_at("old", now - Duration::hours(2)));
        assert!(alerts.resolve_alert("old"));

        assert_eq!(alerts.clear_alerts_older_than(now), 1);
        assert!(alerts.alert_history().is_empty());
    }

    #[test]
    fn oversized_retention_evicts_nothing() {
        let config = AlertConfig {
            retention_minutes: i64::MAX,
            ..AlertConfig::default()
        };
        let alerts = AlertService::with_seed(config, 3);
        alerts.insert_alert(alert_at("ancient", Utc::now() - Duration::days(3_650)));

        assert_eq!(alerts.clear_old_alerts(), 0);
        assert_eq!(alerts.alert_history().len(), 1);
    }

    #[test]
    fn clear_old_alerts_keeps_new_ones() {
        let alerts = service();
        alerts.insert_alert(alert_at("fresh", Utc::now()));
        assert_eq!(alerts.clear_old_alerts(), 0);
        assert_eq!(alerts.alert_history().len(), 1);
    }

    #[test]
    fn emergency_is_unavailable() {
        let alerts = service();
        let outcome = alerts.send_emergency_alert(&here(), &["+15550100".to_string()]);

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Emergency alerts not yet implemented");
        assert!(outcome.alert.is_none());
        assert!(alerts.alert_history().is_empty());
    }
}
