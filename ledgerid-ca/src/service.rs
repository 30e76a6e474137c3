use async_trait::async_trait;
use ledgerid_common::Identity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a certificate authority collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaError {
    /// The CA processed the request and refused it. Carries the CA's reason.
    #[error("Rejected by CA: {0}")]
    Rejected(String),

    /// The request never got a verdict (connection refused, reset, TLS failure...).
    #[error("CA transport failure: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    /// Embed the attribute in the enrollment certificate.
    pub ecert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(rename = "enrollmentID")]
    pub enrollment_id: String,
    pub affiliation: String,
    pub role: String,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollRequest {
    #[serde(rename = "enrollmentID")]
    pub enrollment_id: String,
    #[serde(rename = "enrollmentSecret")]
    pub enrollment_secret: String,
}

/// PEM certificate and private key returned by a successful enrollment.
#[derive(Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub certificate: String,
    pub private_key: String,
}

impl std::fmt::Debug for Enrollment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enrollment")
            .field("certificate", &self.certificate)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// The two operations a certificate authority exposes.
#[async_trait]
pub trait CaService: Send + Sync {
    /// Registers a new enrollment id and returns its one-time secret.
    async fn register(&self, request: &RegisterRequest, registrar: &Identity) -> Result<String, CaError>;

    /// Exchanges an enrollment id and secret for a certificate and key.
    async fn enroll(&self, request: &EnrollRequest) -> Result<Enrollment, CaError>;
}
