//! Gender categories and the per-category privacy flags.
//!
//! Every user holds six independent flags: whether each gender category may
//! see them on the map, and whether each category may receive assistance
//! requests from them.

use serde::{Deserialize, Serialize};

/// Gender category used for privacy filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Woman.
    #[serde(rename = "woman", alias = "female")]
    Woman,
    /// Man.
    #[serde(rename = "man", alias = "male")]
    Man,
    /// Non-binary.
    #[serde(rename = "non-binary", alias = "nonBinary")]
    NonBinary,
}

impl Gender {
    /// All categories, in display order.
    pub const ALL: [Self; 3] = [Self::Woman, Self::Man, Self::NonBinary];

    /// Converts to string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Woman => "woman",
            Self::Man => "man",
            Self::NonBinary => "non-binary",
        }
    }

    /// Parses from string representation, accepting legacy spellings.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "woman" | "female" => Some(Self::Woman),
            "man" | "male" => Some(Self::Man),
            "non-binary" | "nonBinary" => Some(Self::NonBinary),
            _ => None,
        }
    }
}

/// Visibility and request-receiving flags, keyed by peer gender category.
///
/// Missing keys in a stored document fall back to their individual default,
/// so all six flags are always present after deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)] // Six independent user-facing toggles.
pub struct PrivacySettings {
    /// Women may see this user on the map.
    pub visible_to_women: bool,
    /// Men may see this user on the map.
    pub visible_to_men: bool,
    /// Non-binary users may see this user on the map.
    pub visible_to_non_binary: bool,
    /// This user's requests may reach women.
    pub can_receive_requests_from_women: bool,
    /// This user's requests may reach men.
    pub can_receive_requests_from_men: bool,
    /// This user's requests may reach non-binary users.
    pub can_receive_requests_from_non_binary: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            visible_to_women: true,
            visible_to_men: true,
            visible_to_non_binary: true,
            can_receive_requests_from_women: true,
            can_receive_requests_from_men: false, // Conservative default
            can_receive_requests_from_non_binary: true,
        }
    }
}

impl PrivacySettings {
    /// Whether a viewer of the given category may see this user.
    #[must_use]
    pub const fn is_visible_to(&self, viewer: Gender) -> bool {
        match viewer {
            Gender::Woman => self.visible_to_women,
            Gender::Man => self.visible_to_men,
            Gender::NonBinary => self.visible_to_non_binary,
        }
    }

    /// Whether a viewer of the given category may receive alerts from this user.
    #[must_use]
    pub const fn accepts_requests_from(&self, viewer: Gender) -> bool {
        match viewer {
            Gender::Woman => self.can_receive_requests_from_women,
            Gender::Man => self.can_receive_requests_from_men,
            Gender::NonBinary => self.can_receive_requests_from_non_binary,
        }
    }

    /// Sets the visibility flag for one category.
    pub fn set_visible_to(&mut self, viewer: Gender, visible: bool) {
        match viewer {
            Gender::Woman => self.visible_to_women = visible,
            Gender::Man => self.visible_to_men = visible,
            Gender::NonBinary => self.visible_to_non_binary = visible,
        }
    }

    /// Sets the request-receiving flag for one category.
    pub fn set_accepts_requests_from(&mut self, viewer: Gender, accepts: bool) {
        match viewer {
            Gender::Woman => self.can_receive_requests_from_women = accepts,
            Gender::Man => self.can_receive_requests_from_men = accepts,
            Gender::NonBinary => self.can_receive_requests_from_non_binary = accepts,
        }
    }
}
