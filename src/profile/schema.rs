//! Versioned on-disk representation of the profile document.
//!
//! | Version | Shape |
//! |---------|-------|
//! | 0       | Unversioned document from the first app release. Gender may use `female`/`male`/`nonBinary`, `privacySettings` may be missing or `null`, `lastActiveAt` may be missing. |
//! | 1       | Current: `schemaVersion` plus the [`UserProfile`] fields. |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ProfileError, Result};
use super::types::UserProfile;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_FIELD: &str = "schemaVersion";

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    schema_version: u32,
    #[serde(flatten)]
    profile: UserProfile,
}

/// A decoded document and whether it had to be migrated.
#[derive(Debug)]
pub struct Decoded {
    /// The profile at the current schema.
    pub profile: UserProfile,
    /// True when the stored document was older and should be rewritten.
    pub migrated: bool,
}

/// Encodes a profile at the current schema version.
///
/// # Errors
///
/// Returns an error if serialization fails (extremely rare).
pub fn encode(profile: &UserProfile) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string(&StoredProfile {
        schema_version: CURRENT_SCHEMA_VERSION,
        profile: profile.clone(),
    })
}

/// Decodes a stored document, migrating older versions.
///
/// # Errors
///
/// - [`ProfileError::UnsupportedSchema`] for documents newer than this build
/// - [`ProfileError::InvalidDocument`] for anything that is not a profile
pub fn decode(json: &str) -> Result<Decoded> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ProfileError::InvalidDocument(e.to_string()))?;
    let Value::Object(mut document) = value else {
        return Err(ProfileError::InvalidDocument(
            "profile document is not a JSON object".to_string(),
        ));
    };

    let version = match document.get(SCHEMA_VERSION_FIELD) {
        None => 0,
        Some(v) => v
            .as_u64()
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .ok_or_else(|| {
                ProfileError::InvalidDocument(format!("invalid {SCHEMA_VERSION_FIELD}: {v}"))
            })?,
    };

    if version > CURRENT_SCHEMA_VERSION {
        return Err(ProfileError::UnsupportedSchema(version));
    }

    let migrated = version < CURRENT_SCHEMA_VERSION;
    if version == 0 {
        migrate_v0(&mut document);
    }

    let stored: StoredProfile = serde_json::from_value(Value::Object(document))
        .map_err(|e| ProfileError::InvalidDocument(e.to_string()))?;

    Ok(Decoded {
        profile: stored.profile,
        migrated,
    })
}

/// Upgrades an unversioned document in place to version 1.
fn migrate_v0(document: &mut Map<String, Value>) {
    // Legacy gender spellings are accepted by `Gender`'s serde aliases.
    if matches!(document.get("privacySettings"), Some(Value::Null)) {
        document.remove("privacySettings");
    }

    if !document.contains_key("lastActiveAt") {
        if let Some(created_at) = document.get("createdAt").cloned() {
            document.insert("lastActiveAt".to_string(), created_at);
        }
    }

    document.insert(
        SCHEMA_VERSION_FIELD.to_string(),
        Value::from(CURRENT_SCHEMA_VERSION),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::{Gender, PrivacySettings};
    use chrono::Utc;

    fn sample_profile() -> UserProfile {
        let now = Utc::now();
        UserProfile {
            user_id: "user_1700000000000_k3j9x0abc".to_string(),
            gender: Gender::NonBinary,
            privacy_settings: PrivacySettings::default(),
            created_at: now,
            last_active_at: now,
            has_completed_onboarding: true,
        }
    }

    #[test]
    fn encode_writes_schema_version() {
        let json = encode(&sample_profile()).unwrap();
        assert!(json.contains("\"schemaVersion\":1"));
        assert!(json.contains("\"userId\""));
    }

    #[test]
    fn current_document_decodes_without_migration() {
        let profile = sample_profile();
        let decoded = decode(&encode(&profile).unwrap()).unwrap();

        assert!(!decoded.migrated);
        assert_eq!(decoded.profile, profile);
    }

    #[test]
    fn legacy_document_is_migrated() {
        let legacy = r#"{
            "hasCompletedOnboarding": true,
            "userId": "user_1690000000000_abcdefghi",
            "gender": "female",
            "privacySettings": {"visibleToMen": false},
            "createdAt": "2024-05-01T10:00:00.000Z"
        }"#;

        let decoded = decode(legacy).unwrap();

        assert!(decoded.migrated);
        assert_eq!(decoded.profile.gender, Gender::Woman);
        assert!(!decoded.profile.privacy_settings.visible_to_men);
        assert!(decoded.profile.privacy_settings.visible_to_women);
        assert!(!decoded.profile.privacy_settings.can_receive_requests_from_men);
        assert_eq!(decoded.profile.last_active_at, decoded.profile.created_at);
    }

    #[test]
    fn legacy_null_privacy_settings_get_defaults() {
        let legacy = r#"{
            "userId": "user_1_a",
            "gender": "nonBinary",
            "privacySettings": null,
            "createdAt": "2024-05-01T10:00:00Z",
            "lastActiveAt": "2024-05-02T10:00:00Z"
        }"#;

        let decoded = decode(legacy).unwrap();

        assert_eq!(decoded.profile.gender, Gender::NonBinary);
        assert_eq!(decoded.profile.privacy_settings, PrivacySettings::default());
        assert!(!decoded.profile.has_completed_onboarding);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let json = r#"{"schemaVersion": 9, "userId": "x"}"#;
        assert!(matches!(
            decode(json),
            Err(ProfileError::UnsupportedSchema(9))
        ));
    }

    #[test]
    fn non_object_is_invalid() {
        assert!(matches!(
            decode("[1, 2, 3]"),
            Err(ProfileError::InvalidDocument(_))
        ));
        assert!(matches!(
            decode("not json"),
            Err(ProfileError::InvalidDocument(_))
        ));
    }

    #[test]
    fn missing_required_field_is_invalid() {
        let json = r#"{"schemaVersion": 1, "gender": "man"}"#;
        assert!(matches!(
            decode(json),
            Err(ProfileError::InvalidDocument(_))
        ));
    }
}
