//! Profile persistence on top of a [`KeyValueStore`].

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use super::error::{ProfileError, Result};
use super::schema;
use super::types::{ProfileUpdate, UserProfile};
use crate::proximity::{Gender, PrivacySettings};
use crate::storage::{
    get_json, put_json, KeyValueStore, StorageError, ONBOARDING_COMPLETED_KEY, USER_PROFILE_KEY,
};

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Reads and writes the single local user profile.
///
/// The profile document lives under [`USER_PROFILE_KEY`] and is the source
/// of truth. The onboarding flag is mirrored under
/// [`ONBOARDING_COMPLETED_KEY`] on every write for platform code that reads
/// it directly; it is only consulted here when no document exists.
/// There is no conflict detection: the last write wins.
pub struct ProfileStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileStore {
    /// Creates a profile store over the given backend.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Creates and persists a fresh profile, completing onboarding.
    ///
    /// Any existing profile is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Persistence`] if the write fails.
    pub fn create_user_profile(
        &self,
        gender: Gender,
        privacy_settings: PrivacySettings,
    ) -> Result<UserProfile> {
        let now = Utc::now();
        let profile = UserProfile {
            user_id: generate_user_id(&mut rand::thread_rng()),
            gender,
            privacy_settings,
            created_at: now,
            last_active_at: now,
            has_completed_onboarding: true,
        };

        self.save(&profile)?;
        tracing::info!(
            user_id = %profile.user_id,
            gender = gender.as_str(),
            "Created user profile"
        );
        Ok(profile)
    }

    /// Loads the current profile, if any.
    ///
    /// Older documents are migrated and written back at the current schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored document cannot be
    /// decoded.
    pub fn user_profile(&self) -> Result<Option<UserProfile>> {
        let Some(json) = self.store.get_item(USER_PROFILE_KEY)? else {
            return Ok(None);
        };

        let decoded = schema::decode(&json)?;
        if decoded.migrated {
            tracing::info!(
                user_id = %decoded.profile.user_id,
                version = schema::CURRENT_SCHEMA_VERSION,
                "Migrated stored profile"
            );
            self.save(&decoded.profile)?;
        }
        Ok(Some(decoded.profile))
    }

    /// Merges a partial update into the stored profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] if no profile exists, or a
    /// persistence error if the read or write fails.
    pub fn update_user_profile(&self, update: ProfileUpdate) -> Result<UserProfile> {
        let mut profile = self.user_profile()?.ok_or(ProfileError::NotFound)?;
        update.apply(&mut profile, Utc::now());
        self.save(&profile)?;
        tracing::debug!(user_id = %profile.user_id, "Updated user profile");
        Ok(profile)
    }

    /// Replaces the privacy settings.
    ///
    /// # Errors
    ///
    /// See [`Self::update_user_profile`].
    pub fn update_privacy_settings(&self, settings: PrivacySettings) -> Result<UserProfile> {
        self.update_user_profile(ProfileUpdate::new().with_privacy_settings(settings))
    }

    /// Changes the gender category.
    ///
    /// # Errors
    ///
    /// See [`Self::update_user_profile`].
    pub fn update_gender(&self, gender: Gender) -> Result<UserProfile> {
        self.update_user_profile(ProfileUpdate::new().with_gender(gender))
    }

    /// Refreshes `last_active_at` without changing anything else.
    ///
    /// # Errors
    ///
    /// See [`Self::update_user_profile`].
    pub fn touch_last_active(&self) -> Result<UserProfile> {
        self.update_user_profile(ProfileUpdate::new())
    }

    /// Returns the stored privacy settings, or the defaults when no
    /// profile exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read.
    pub fn privacy_settings(&self) -> Result<PrivacySettings> {
        Ok(self
            .user_profile()?
            .map(|p| p.privacy_settings)
            .unwrap_or_default())
    }

    /// Returns the stored gender, if a profile exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read.
    pub fn gender(&self) -> Result<Option<Gender>> {
        Ok(self.user_profile()?.map(|p| p.gender))
    }

    /// Whether onboarding has been completed.
    ///
    /// Reads the profile document; the mirrored flag key is only used when
    /// no document exists.
    ///
    /// # Errors
    ///
    /// Returns an error if either key cannot be read.
    pub fn has_completed_onboarding(&self) -> Result<bool> {
        if let Some(profile) = self.user_profile()? {
            return Ok(profile.has_completed_onboarding);
        }
        Ok(get_json::<bool>(self.store.as_ref(), ONBOARDING_COMPLETED_KEY)?.unwrap_or(false))
    }

    /// Whether a profile document is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    pub fn profile_exists(&self) -> Result<bool> {
        Ok(self.store.has_key(USER_PROFILE_KEY)?)
    }

    /// Clears the entire persistence layer, not just the profile keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be cleared.
    pub fn reset_user_profile(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("Reset user profile and cleared storage");
        Ok(())
    }

    /// Marks onboarding as not completed, keeping everything else.
    ///
    /// Succeeds without writing anything when no profile exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read or written.
    #[cfg(feature = "debug-tools")]
    pub fn clear_onboarding_status(&self) -> Result<()> {
        match self.user_profile()? {
            Some(mut profile) => {
                profile.has_completed_onboarding = false;
                self.save(&profile)?;
                tracing::debug!(user_id = %profile.user_id, "Cleared onboarding status");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Writes the document, then mirrors the flag. If the mirror write fails
    /// the stale flag is removed so it cannot contradict the document.
    fn save(&self, profile: &UserProfile) -> Result<()> {
        let result = schema::encode(profile)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set_item(USER_PROFILE_KEY, &json))
            .and_then(|()| {
                put_json(
                    self.store.as_ref(),
                    ONBOARDING_COMPLETED_KEY,
                    &profile.has_completed_onboarding,
                )
                .inspect_err(|_| {
                    if let Err(e) = self.store.remove_item(ONBOARDING_COMPLETED_KEY) {
                        tracing::warn!(error = %e, "Failed to drop stale onboarding flag");
                    }
                })
            });

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to persist user profile");
        }
        Ok(result?)
    }
}

/// Generates an id of the form `user_<unix-millis>_<9 base36 chars>`.
fn generate_user_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("user_{}_{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn store() -> (Arc<MemoryStore>, ProfileStore) {
        let backend = Arc::new(MemoryStore::new());
        let profiles = ProfileStore::new(backend.clone());
        (backend, profiles)
    }

    /// Backend whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn set_item(&self, _key: &str, _value: &str) -> crate::storage::Result<()> {
            Err(StorageError::Backend("read-only".to_string()))
        }
        fn get_item(&self, _key: &str) -> crate::storage::Result<Option<String>> {
            Ok(None)
        }
        fn remove_item(&self, _key: &str) -> crate::storage::Result<()> {
            Ok(())
        }
        fn clear(&self) -> crate::storage::Result<()> {
            Ok(())
        }
        fn all_keys(&self) -> crate::storage::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    /// Memory backend that can be told to reject writes of the flag key.
    #[derive(Default)]
    struct FlakyFlagStore {
        inner: MemoryStore,
        fail_flag: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for FlakyFlagStore {
        fn set_item(&self, key: &str, value: &str) -> crate::storage::Result<()> {
            if key == ONBOARDING_COMPLETED_KEY
                && self.fail_flag.load(std::sync::atomic::Ordering::SeqCst)
            {
                return Err(StorageError::Backend("flag write failed".to_string()));
            }
            self.inner.set_item(key, value)
        }
        fn get_item(&self, key: &str) -> crate::storage::Result<Option<String>> {
            self.inner.get_item(key)
        }
        fn remove_item(&self, key: &str) -> crate::storage::Result<()> {
            self.inner.remove_item(key)
        }
        fn clear(&self) -> crate::storage::Result<()> {
            self.inner.clear()
        }
        fn all_keys(&self) -> crate::storage::Result<Vec<String>> {
            self.inner.all_keys()
        }
    }

    #[test]
    fn failed_flag_write_does_not_contradict_document() {
        let backend = Arc::new(FlakyFlagStore::default());
        let profiles = ProfileStore::new(backend.clone());
        profiles
            .create_user_profile(Gender::Woman, PrivacySettings::default())
            .unwrap();
        assert!(profiles.has_completed_onboarding().unwrap());

        backend
            .fail_flag
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let result =
            profiles.update_user_profile(ProfileUpdate::new().with_onboarding_completed(false));

        assert!(matches!(result, Err(ProfileError::Persistence(_))));
        assert!(!profiles.has_completed_onboarding().unwrap());
        assert!(!backend.has_key(ONBOARDING_COMPLETED_KEY).unwrap());
    }

    #[test]
    fn flag_key_used_only_without_document() {
        let (backend, profiles) = store();
        backend.set_item(ONBOARDING_COMPLETED_KEY, "true").unwrap();

        assert!(profiles.has_completed_onboarding().unwrap());
        assert!(!profiles.profile_exists().unwrap());
    }

    #[test]
    fn user_id_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = generate_user_id(&mut rng);
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn create_then_get_roundtrips() {
        let (_, profiles) = store();
        let created = profiles
            .create_user_profile(Gender::Woman, PrivacySettings::default())
            .unwrap();

        assert!(created.has_completed_onboarding);
        assert_eq!(created.created_at, created.last_active_at);
        assert_eq!(profiles.user_profile().unwrap(), Some(created));
    }

    #[test]
    fn create_writes_onboarding_flag() {
        let (backend, profiles) = store();
        profiles
            .create_user_profile(Gender::Man, PrivacySettings::default())
            .unwrap();

        assert_eq!(
            backend.get_item(ONBOARDING_COMPLETED_KEY).unwrap().as_deref(),
            Some("true")
        );
        assert!(profiles.has_completed_onboarding().unwrap());
        assert!(profiles.profile_exists().unwrap());
    }

    #[test]
    fn no_profile_reads() {
        let (_, profiles) = store();

        assert_eq!(profiles.user_profile().unwrap(), None);
        assert_eq!(profiles.gender().unwrap(), None);
        assert_eq!(
            profiles.privacy_settings().unwrap(),
            PrivacySettings::default()
        );
        assert!(!profiles.has_completed_onboarding().unwrap());
        assert!(!profiles.profile_exists().unwrap());
    }

    #[test]
    fn update_without_profile_is_not_found() {
        let (_, profiles) = store();
        let result = profiles.update_user_profile(ProfileUpdate::new().with_gender(Gender::Man));
        assert!(matches!(result, Err(ProfileError::NotFound)));
        assert!(matches!(
            profiles.touch_last_active(),
            Err(ProfileError::NotFound)
        ));
    }

    #[test]
    fn update_merges_and_persists() {
        let (_, profiles) = store();
        let created = profiles
            .create_user_profile(Gender::Woman, PrivacySettings::default())
            .unwrap();

        let mut settings = PrivacySettings::default();
        settings.visible_to_men = false;
        let updated = profiles.update_privacy_settings(settings).unwrap();

        assert_eq!(updated.user_id, created.user_id);
        assert_eq!(updated.gender, Gender::Woman);
        assert_eq!(updated.privacy_settings, settings);
        assert!(updated.last_active_at >= created.last_active_at);
        assert_eq!(profiles.privacy_settings().unwrap(), settings);

        profiles.update_gender(Gender::NonBinary).unwrap();
        assert_eq!(profiles.gender().unwrap(), Some(Gender::NonBinary));
    }

    #[test]
    fn update_onboarding_mirrors_flag_key() {
        let (backend, profiles) = store();
        profiles
            .create_user_profile(Gender::Woman, PrivacySettings::default())
            .unwrap();

        profiles
            .update_user_profile(ProfileUpdate::new().with_onboarding_completed(false))
            .unwrap();

        assert_eq!(
            backend.get_item(ONBOARDING_COMPLETED_KEY).unwrap().as_deref(),
            Some("false")
        );
        assert!(!profiles.has_completed_onboarding().unwrap());
    }

    #[test]
    fn reset_clears_all_keys() {
        let (backend, profiles) = store();
        profiles
            .create_user_profile(Gender::Man, PrivacySettings::default())
            .unwrap();
        backend.set_item("unrelated", "1").unwrap();

        profiles.reset_user_profile().unwrap();

        assert!(backend.all_keys().unwrap().is_empty());
        assert_eq!(profiles.user_profile().unwrap(), None);
    }

    #[test]
    fn legacy_document_is_rewritten() {
        let (backend, profiles) = store();
        backend
            .set_item(
                USER_PROFILE_KEY,
                r#"{"userId":"user_1_abc","gender":"male","createdAt":"2024-01-01T00:00:00Z"}"#,
            )
            .unwrap();

        let profile = profiles.user_profile().unwrap().unwrap();
        assert_eq!(profile.gender, Gender::Man);

        let raw = backend.get_item(USER_PROFILE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"schemaVersion\":1"));
        assert!(raw.contains("\"gender\":\"man\""));
    }

    #[test]
    fn newer_document_is_left_untouched() {
        let (backend, profiles) = store();
        let raw = r#"{"schemaVersion":2,"userId":"u"}"#;
        backend.set_item(USER_PROFILE_KEY, raw).unwrap();

        assert!(matches!(
            profiles.user_profile(),
            Err(ProfileError::UnsupportedSchema(2))
        ));
        assert_eq!(
            backend.get_item(USER_PROFILE_KEY).unwrap().as_deref(),
            Some(raw)
        );
    }

    #[test]
    fn write_failure_is_persistence_error() {
        let profiles = ProfileStore::new(Arc::new(ReadOnlyStore));
        let result = profiles.create_user_profile(Gender::Woman, PrivacySettings::default());
        assert!(matches!(result, Err(ProfileError::Persistence(_))));
    }

    #[cfg(feature = "debug-tools")]
    #[test]
    fn clear_onboarding_keeps_profile() {
        let (_, profiles) = store();
        let created = profiles
            .create_user_profile(Gender::Woman, PrivacySettings::default())
            .unwrap();

        profiles.clear_onboarding_status().unwrap();

        let loaded = profiles.user_profile().unwrap().unwrap();
        assert_eq!(loaded.user_id, created.user_id);
        assert!(!loaded.has_completed_onboarding);
        assert!(!profiles.has_completed_onboarding().unwrap());
    }

    #[cfg(feature = "debug-tools")]
    #[test]
    fn clear_onboarding_without_profile_succeeds() {
        let (_, profiles) = store();
        assert!(profiles.clear_onboarding_status().is_ok());
        assert!(!profiles.profile_exists().unwrap());
    }
}
