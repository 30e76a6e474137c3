use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ledgerid_ca::CertificateAuthorityClient;
use ledgerid_common::{
    with_deadline, Deadlines, GatewayError, Identity, OrganizationProfile, OrganizationRegistry, Result, ADMIN_LABEL,
};
use ledgerid_wallet::{is_valid_label, IdentityStore};
use tracing::{debug, info, warn};

use super::types::{EnrollmentOutcome, RegistrationRequest};
use crate::flight::{Role, SingleFlight};

#[derive(Clone)]
struct OrgServices {
    wallet: Arc<dyn IdentityStore>,
    ca: CertificateAuthorityClient,
}

struct Inner {
    registry: Arc<OrganizationRegistry>,
    services: HashMap<String, OrgServices>,
    wallet_deadline: Duration,
    // keyed by organization
    admin_flights: SingleFlight<Identity>,
    // keyed by "<organization>/<username>"
    user_flights: SingleFlight<EnrollmentOutcome>,
}

/// Orchestrates admin bootstrap, registration and enrollment per organization.
///
/// Admin bootstrap is single-flight per organization and user enrollment is
/// single-flight per (organization, username): concurrent callers for the same
/// key share one CA round trip and all observe its outcome. Nothing is written
/// to a wallet until registration and enrollment have both succeeded.
#[derive(Clone)]
pub struct IdentityManager {
    inner: Arc<Inner>,
}

pub struct IdentityManagerBuilder {
    registry: Arc<OrganizationRegistry>,
    services: HashMap<String, OrgServices>,
    wallet_deadline: Duration,
}

impl IdentityManagerBuilder {
    pub fn deadlines(mut self, deadlines: &Deadlines) -> Self {
        self.wallet_deadline = deadlines.wallet;
        self
    }

    pub fn organization(
        mut self,
        org: impl Into<String>,
        wallet: Arc<dyn IdentityStore>,
        ca: CertificateAuthorityClient,
    ) -> Self {
        self.services.insert(org.into(), OrgServices { wallet, ca });
        self
    }

    /// Fails if a registered organization has no wallet/CA pair or vice versa.
    pub fn build(self) -> Result<IdentityManager> {
        for org in self.registry.ids() {
            if !self.services.contains_key(&org) {
                return Err(GatewayError::Config(format!("No wallet or CA configured for {}", org)));
            }
        }
        for org in self.services.keys() {
            self.registry.resolve(org)?;
        }

        Ok(IdentityManager {
            inner: Arc::new(Inner {
                registry: self.registry,
                services: self.services,
                wallet_deadline: self.wallet_deadline,
                admin_flights: SingleFlight::new(),
                user_flights: SingleFlight::new(),
            }),
        })
    }
}

impl IdentityManager {
    pub fn builder(registry: Arc<OrganizationRegistry>) -> IdentityManagerBuilder {
        IdentityManagerBuilder {
            registry,
            services: HashMap::new(),
            wallet_deadline: Deadlines::default().wallet,
        }
    }

    pub fn registry(&self) -> &Arc<OrganizationRegistry> {
        &self.inner.registry
    }

    /// The wallet backing `org`.
    pub fn wallet(&self, org: &str) -> Result<Arc<dyn IdentityStore>> {
        Ok(self.inner.services(org)?.wallet)
    }

    /// Makes sure `request.username` has an enrolled identity in its organization's wallet.
    ///
    /// Repeat calls for an enrolled user return immediately without touching the CA.
    /// Only the caller that actually enrolled the user sees `newly_enrolled` and the secret.
    pub async fn ensure_identity(&self, request: &RegistrationRequest) -> Result<EnrollmentOutcome> {
        let profile = self.inner.registry.resolve(&request.organization)?;
        let services = self.inner.services(&profile.id)?;

        // The username becomes the wallet label; reject it before the CA knows about it.
        if !is_valid_label(&request.username) {
            return Err(GatewayError::RegistrationFailed(format!("Invalid username '{}'", request.username)));
        }

        // 1. Already cached
        if self.inner.wallet_get(&services, &request.username).await?.is_some() {
            info!("An identity for the user {} already exists in the {} wallet", request.username, profile.id);
            return Ok(EnrollmentOutcome::existing(&request.username));
        }

        // 2-5. Bootstrap admin, register, enroll, persist, once per (org, username)
        let key = format!("{}/{}", profile.id, request.username);
        let inner = self.inner.clone();
        let username = request.username.clone();
        let request = request.clone();
        let (role, outcome) = self
            .inner
            .user_flights
            .run_with_role(&key, move || inner.enroll_user(profile, request))
            .await;
        match role {
            Role::Leader => outcome,
            Role::Follower => outcome.map(|_| EnrollmentOutcome::existing(&username)),
        }
    }

    /// Pure wallet existence check; never contacts the CA.
    pub async fn is_registered(&self, username: &str, org: &str) -> Result<bool> {
        let services = self.inner.services(org)?;
        let found = with_deadline(self.inner.wallet_deadline, "wallet.contains", services.wallet.contains(username)).await?;
        if found {
            debug!("An identity for the user {} exists in the {} wallet", username, org);
        }
        Ok(found)
    }

    pub async fn identity(&self, username: &str, org: &str) -> Result<Option<Identity>> {
        let services = self.inner.services(org)?;
        self.inner.wallet_get(&services, username).await
    }

    /// Returns the organization's admin identity, enrolling it first if needed.
    pub async fn ensure_admin(&self, org: &str) -> Result<Identity> {
        let profile = self.inner.registry.resolve(org)?;
        self.inner.clone().ensure_admin(profile).await
    }
}

impl Inner {
    fn services(&self, org: &str) -> Result<OrgServices> {
        self.services
            .get(org)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownOrganization(org.to_string()))
    }

    async fn wallet_get(&self, services: &OrgServices, label: &str) -> Result<Option<Identity>> {
        with_deadline(self.wallet_deadline, "wallet.get", services.wallet.get(label)).await
    }

    async fn wallet_put(&self, services: &OrgServices, label: &str, identity: &Identity) -> Result<()> {
        with_deadline(self.wallet_deadline, "wallet.put", services.wallet.put(label, identity)).await
    }

    async fn enroll_user(self: Arc<Self>, profile: Arc<OrganizationProfile>, request: RegistrationRequest) -> Result<EnrollmentOutcome> {
        let services = self.services(&profile.id)?;
        let username = request.username.as_str();

        // Another flight may have finished between the caller's check and this one starting.
        if self.wallet_get(&services, username).await?.is_some() {
            return Ok(EnrollmentOutcome::existing(username));
        }

        let admin = self.clone().ensure_admin(profile.clone()).await?;

        let secret = services
            .ca
            .register_user(username, request.permission, &profile.affiliation, &admin)
            .await
            .map_err(|e| {
                warn!("Registration of {} in {} failed: {}", username, profile.id, e);
                e
            })?;

        let enrollment = services.ca.enroll(username, &secret).await.map_err(|e| {
            warn!("Enrollment of {} in {} failed: {}", username, profile.id, e);
            e
        })?;

        let identity = Identity::x509(enrollment.certificate, enrollment.private_key, profile.msp_id.as_str());
        self.wallet_put(&services, username, &identity).await?;

        info!("Successfully registered and enrolled user {} and imported it into the {} wallet", username, profile.id);
        Ok(EnrollmentOutcome::enrolled(username, secret))
    }

    async fn ensure_admin(self: Arc<Self>, profile: Arc<OrganizationProfile>) -> Result<Identity> {
        let services = self.services(&profile.id)?;
        if let Some(admin) = self.wallet_get(&services, ADMIN_LABEL).await? {
            return Ok(admin);
        }

        let inner = self.clone();
        let key = profile.id.clone();
        self.admin_flights
            .run(&key, move || inner.bootstrap_admin(profile))
            .await
    }

    async fn bootstrap_admin(self: Arc<Self>, profile: Arc<OrganizationProfile>) -> Result<Identity> {
        let services = self.services(&profile.id)?;
        if let Some(admin) = self.wallet_get(&services, ADMIN_LABEL).await? {
            return Ok(admin);
        }

        info!("An identity for the admin user \"{}\" does not exist in the {} wallet, enrolling", ADMIN_LABEL, profile.id);

        let bootstrap = &profile.bootstrap;
        let enrollment = services
            .ca
            .enroll(&bootstrap.enrollment_id, &bootstrap.secret)
            .await
            .map_err(|e| {
                warn!("Failed to enroll admin user for {}: {}", profile.id, e);
                e
            })?;

        let identity = Identity::x509(enrollment.certificate, enrollment.private_key, profile.msp_id.as_str());
        self.wallet_put(&services, ADMIN_LABEL, &identity).await?;

        info!("Successfully enrolled admin user \"{}\" and imported it into the {} wallet", ADMIN_LABEL, profile.id);
        Ok(identity)
    }
}

impl std::fmt::Debug for IdentityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityManager")
            .field("organizations", &self.inner.registry.ids())
            .finish()
    }
}
