use std::fmt;

use serde::{Deserialize, Serialize};

/// Permission tier requested when a user is first registered.
///
/// Only the exact string `"READ-WRITE"` selects the privileged tier; any other
/// value (or no value at all) is the standard tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PermissionTier {
    ReadWrite,
    #[default]
    Standard,
}

impl PermissionTier {
    pub const READ_WRITE: &'static str = "READ-WRITE";

    pub fn from_optional(raw: Option<&str>) -> Self {
        match raw {
            Some(Self::READ_WRITE) => PermissionTier::ReadWrite,
            _ => PermissionTier::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionTier::ReadWrite => Self::READ_WRITE,
            PermissionTier::Standard => "STANDARD",
        }
    }
}

impl From<&str> for PermissionTier {
    fn from(raw: &str) -> Self {
        PermissionTier::from_optional(Some(raw))
    }
}

impl From<String> for PermissionTier {
    fn from(raw: String) -> Self {
        PermissionTier::from(raw.as_str())
    }
}

impl From<PermissionTier> for String {
    fn from(tier: PermissionTier) -> Self {
        tier.as_str().to_string()
    }
}

impl fmt::Display for PermissionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exact_read_write_is_privileged() {
        assert_eq!(PermissionTier::from("READ-WRITE"), PermissionTier::ReadWrite);
        assert_eq!(PermissionTier::from("read-write"), PermissionTier::Standard);
        assert_eq!(PermissionTier::from("READ"), PermissionTier::Standard);
        assert_eq!(PermissionTier::from_optional(None), PermissionTier::Standard);
    }

    #[test]
    fn test_deserialize_unknown_tier_as_standard() {
        let tier: PermissionTier = serde_json::from_str("\"READ-ONLY\"").unwrap();
        assert_eq!(tier, PermissionTier::Standard);
        let tier: PermissionTier = serde_json::from_str("\"READ-WRITE\"").unwrap();
        assert_eq!(tier, PermissionTier::ReadWrite);
    }
}
