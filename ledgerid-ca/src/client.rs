use std::sync::Arc;
use std::time::Duration;

use ledgerid_common::{with_deadline, CaEndpoint, GatewayError, Identity, PermissionTier, Result};

use crate::policy::role_assignment;
use crate::service::{CaError, CaService, EnrollRequest, Enrollment, RegisterRequest};

/// Domain-level access to one organization's certificate authority.
///
/// Owns the tier → affiliation/role mapping and the translation of CA
/// failures into the gateway error taxonomy. Every call is bounded by `deadline`.
#[derive(Clone)]
pub struct CertificateAuthorityClient {
    service: Arc<dyn CaService>,
    endpoint: CaEndpoint,
    deadline: Duration,
}

impl CertificateAuthorityClient {
    pub fn new(service: Arc<dyn CaService>, endpoint: CaEndpoint, deadline: Duration) -> Self {
        Self { service, endpoint, deadline }
    }

    pub fn endpoint(&self) -> &CaEndpoint {
        &self.endpoint
    }

    /// Registers `username` with the attributes derived from `tier` and returns the secret.
    pub async fn register_user(
        &self,
        username: &str,
        tier: PermissionTier,
        default_affiliation: &str,
        registrar: &Identity,
    ) -> Result<String> {
        let request = role_assignment(tier, default_affiliation).into_request(username);
        self.register(&request, registrar).await
    }

    pub async fn register(&self, request: &RegisterRequest, registrar: &Identity) -> Result<String> {
        tracing::info!(
            "Registering {} with {} (affiliation={}, role={})",
            request.enrollment_id,
            self.endpoint.url,
            request.affiliation,
            request.attrs.first().map(|a| a.value.as_str()).unwrap_or("-")
        );

        with_deadline(self.deadline, "ca.register", async {
            self.service
                .register(request, registrar)
                .await
                .map_err(|e| match e {
                    CaError::Rejected(reason) => GatewayError::RegistrationFailed(reason),
                    CaError::Transport(reason) => GatewayError::CaUnreachable(reason),
                })
        })
        .await
    }

    pub async fn enroll(&self, enrollment_id: &str, secret: &str) -> Result<Enrollment> {
        tracing::info!("Enrolling {} with {}", enrollment_id, self.endpoint.url);

        let request = EnrollRequest {
            enrollment_id: enrollment_id.to_string(),
            enrollment_secret: secret.to_string(),
        };

        with_deadline(self.deadline, "ca.enroll", async {
            self.service.enroll(&request).await.map_err(|e| match e {
                CaError::Rejected(reason) => GatewayError::EnrollmentFailed(reason),
                CaError::Transport(reason) => GatewayError::CaUnreachable(reason),
            })
        })
        .await
    }
}

impl std::fmt::Debug for CertificateAuthorityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateAuthorityClient")
            .field("endpoint", &self.endpoint)
            .field("deadline", &self.deadline)
            .finish()
    }
}
