use ledgerid_common::PermissionTier;
use serde::{Deserialize, Serialize};

/// Domain attributes supplied when a user signs up.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAttributes {
    pub name: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: String,
}

impl std::fmt::Debug for UserAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAttributes")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("user_type", &self.user_type)
            .finish()
    }
}

/// Everything needed to make sure a user has an enrolled identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub username: String,
    pub organization: String,
    pub permission: PermissionTier,
    /// The permission string as the caller sent it; recorded on the ledger verbatim.
    pub access: Option<String>,
    pub attributes: UserAttributes,
}

impl RegistrationRequest {
    pub fn new(username: impl Into<String>, organization: impl Into<String>, permission: PermissionTier) -> Self {
        Self {
            username: username.into(),
            organization: organization.into(),
            permission,
            access: match permission {
                PermissionTier::ReadWrite => Some(PermissionTier::READ_WRITE.to_string()),
                PermissionTier::Standard => None,
            },
            attributes: UserAttributes::default(),
        }
    }

    /// Builds a request from the caller's raw permission string, which may be
    /// any value or none at all.
    pub fn requested(username: impl Into<String>, organization: impl Into<String>, permission: Option<String>) -> Self {
        let tier = PermissionTier::from_optional(permission.as_deref());
        Self {
            access: permission,
            ..Self::new(username, organization, tier)
        }
    }

    pub fn with_attributes(mut self, attributes: UserAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Result of `ensure_identity`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentOutcome {
    pub success: bool,
    pub message: String,
    /// One-time registration secret; only present when this call enrolled the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip)]
    pub newly_enrolled: bool,
}

impl EnrollmentOutcome {
    pub(crate) fn existing(username: &str) -> Self {
        Self {
            success: true,
            message: confirmation(username),
            secret: None,
            newly_enrolled: false,
        }
    }

    pub(crate) fn enrolled(username: &str, secret: String) -> Self {
        Self {
            success: true,
            message: confirmation(username),
            secret: Some(secret),
            newly_enrolled: true,
        }
    }
}

impl std::fmt::Debug for EnrollmentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollmentOutcome")
            .field("success", &self.success)
            .field("message", &self.message)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("newly_enrolled", &self.newly_enrolled)
            .finish()
    }
}

fn confirmation(username: &str) -> String {
    format!("{} enrolled Successfully", username)
}
