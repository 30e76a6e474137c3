use ledgerid_common::PermissionTier;
use serde::{Deserialize, Serialize};

use crate::identity::types::{RegistrationRequest, UserAttributes};

/// An invocation as received from an outer layer (HTTP handler, CLI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub channel: String,
    pub chaincode: String,
    #[serde(alias = "fcn")]
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub username: String,
    #[serde(alias = "orgName")]
    pub organization: String,
    /// `None` (or `null`) means the standard tier.
    #[serde(default)]
    pub permission: Option<PermissionTier>,
}

impl TransactionRequest {
    pub fn new(
        channel: impl Into<String>,
        chaincode: impl Into<String>,
        function: impl Into<String>,
        args: Vec<String>,
        username: impl Into<String>,
        organization: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            chaincode: chaincode.into(),
            function: function.into(),
            args,
            username: username.into(),
            organization: organization.into(),
            permission: None,
        }
    }

    pub fn with_permission(mut self, permission: PermissionTier) -> Self {
        self.permission = Some(permission);
        self
    }

    /// The identity the invocation acts as.
    pub fn registration(&self) -> RegistrationRequest {
        RegistrationRequest::new(
            self.username.clone(),
            self.organization.clone(),
            self.permission.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub message: String,
    pub result: SubmitResult,
}

/// Outcome of the sign-up flow.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SubmitResult>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("success", &self.success)
            .field("message", &self.message)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("result", &self.result)
            .finish()
    }
}

/// The single JSON argument `CreateUser` receives on sign-up.
#[derive(Debug, Serialize)]
pub(crate) struct UserRecord<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub password: &'a str,
    #[serde(rename = "type")]
    pub user_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<&'a str>,
}

impl<'a> UserRecord<'a> {
    pub(crate) fn new(username: &'a str, attributes: &'a UserAttributes, access: Option<&'a str>) -> Self {
        Self {
            id: username,
            name: &attributes.name,
            password: &attributes.password,
            user_type: &attributes.user_type,
            access,
        }
    }
}
