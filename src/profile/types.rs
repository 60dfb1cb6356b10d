//! Profile data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::proximity::{Gender, PrivacySettings};

/// The locally stored user profile.
///
/// Created once when onboarding completes, mutated through
/// [`ProfileUpdate`]s, destroyed by a full reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Opaque user identifier (`user_<millis>_<random>`).
    pub user_id: String,
    /// Gender category used for privacy filtering.
    pub gender: Gender,
    /// The user's six privacy flags.
    #[serde(default)]
    pub privacy_settings: PrivacySettings,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// Last time the profile was written.
    pub last_active_at: DateTime<Utc>,
    /// Whether onboarding has been completed.
    #[serde(default)]
    pub has_completed_onboarding: bool,
}

/// A partial profile update. Unset fields are left untouched.
///
/// # Example
///
/// ```
/// use assist_core::profile::ProfileUpdate;
/// use assist_core::proximity::Gender;
///
/// let update = ProfileUpdate::new().with_gender(Gender::NonBinary);
/// assert_eq!(update.gender, Some(Gender::NonBinary));
/// assert!(update.privacy_settings.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New gender category.
    pub gender: Option<Gender>,
    /// Replacement privacy flags.
    pub privacy_settings: Option<PrivacySettings>,
    /// New onboarding completion state.
    pub has_completed_onboarding: Option<bool>,
}

impl ProfileUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gender.
    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Sets the privacy settings.
    #[must_use]
    pub fn with_privacy_settings(mut self, settings: PrivacySettings) -> Self {
        self.privacy_settings = Some(settings);
        self
    }

    /// Sets the onboarding completion flag.
    #[must_use]
    pub fn with_onboarding_completed(mut self, completed: bool) -> Self {
        self.has_completed_onboarding = Some(completed);
        self
    }

    /// Merges the update into a profile and stamps `last_active_at`.
    pub fn apply(self, profile: &mut UserProfile, now: DateTime<Utc>) {
        if let Some(gender) = self.gender {
            profile.gender = gender;
        }
        if let Some(settings) = self.privacy_settings {
            profile.privacy_settings = settings;
        }
        if let Some(completed) = self.has_completed_onboarding {
            profile.has_completed_onboarding = completed;
        }
        profile.last_active_at = now;
    }
}
