//! Folder permission levels.
//!
//! Levels are strictly ordered: a user holding a higher level implicitly
//! holds every lower one, so `manage` grants `view`, `upload`, and `delete`.
//! These string values must match the CHECK constraint on
//! `permissions.level` in the initial schema migration.

use serde::{Deserialize, Serialize};

/// Access level a user holds on a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// List the folder and read its templates.
    View,
    /// Upload new templates into the folder.
    Upload,
    /// Delete templates and the folder itself.
    Delete,
    /// Grant and revoke permissions on the folder.
    Manage,
}

impl PermissionLevel {
    /// The canonical database string for this level.
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::View => "view",
            PermissionLevel::Upload => "upload",
            PermissionLevel::Delete => "delete",
            PermissionLevel::Manage => "manage",
        }
    }

    /// Parse a database string into a level. Unknown strings return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(PermissionLevel::View),
            "upload" => Some(PermissionLevel::Upload),
            "delete" => Some(PermissionLevel::Delete),
            "manage" => Some(PermissionLevel::Manage),
            _ => None,
        }
    }

    /// Whether a holder of `self` may perform an action requiring `required`.
    pub fn allows(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manage_allows_everything() {
        for required in [
            PermissionLevel::View,
            PermissionLevel::Upload,
            PermissionLevel::Delete,
            PermissionLevel::Manage,
        ] {
            assert!(PermissionLevel::Manage.allows(required));
        }
    }

    #[test]
    fn view_allows_only_view() {
        assert!(PermissionLevel::View.allows(PermissionLevel::View));
        assert!(!PermissionLevel::View.allows(PermissionLevel::Upload));
        assert!(!PermissionLevel::View.allows(PermissionLevel::Delete));
        assert!(!PermissionLevel::View.allows(PermissionLevel::Manage));
    }

    #[test]
    fn roundtrips_through_strings() {
        for level in [
            PermissionLevel::View,
            PermissionLevel::Upload,
            PermissionLevel::Delete,
            PermissionLevel::Manage,
        ] {
            assert_eq!(PermissionLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(PermissionLevel::parse("owner"), None);
    }
}
