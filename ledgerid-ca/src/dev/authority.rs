use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ed25519_dalek::{SigningKey, VerifyingKey};
use ledgerid_common::{BootstrapCredentials, Identity, OrganizationProfile};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use super::certificate::{self, CertificateBody};
use super::pem;
use crate::service::{Attribute, CaError, CaService, EnrollRequest, Enrollment, RegisterRequest};

const SECRET_LEN: usize = 16;

#[derive(Debug, Clone)]
struct Registration {
    secret: String,
    affiliation: String,
    attrs: Vec<Attribute>,
    registrar: bool,
}

struct Inner {
    name: String,
    signing_key: SigningKey,
    registrations: Mutex<HashMap<String, Registration>>,
    register_log: Mutex<Vec<RegisterRequest>>,
    register_calls: AtomicUsize,
    enroll_calls: AtomicUsize,
    reachable: AtomicBool,
    latency_ms: AtomicU64,
}

/// Development certificate authority.
///
/// Pre-seeded with the bootstrap registrar; only identities it issued and that
/// hold registrar rights may register others. Cloning shares the same state.
#[derive(Clone)]
pub struct DevCertificateAuthority {
    inner: Arc<Inner>,
}

impl DevCertificateAuthority {
    pub fn new(name: &str, bootstrap: &BootstrapCredentials) -> Self {
        let seed: [u8; 32] = Sha256::digest(format!("ledgerid-dev-ca:{}", name).as_bytes()).into();

        let mut registrations = HashMap::new();
        registrations.insert(
            bootstrap.enrollment_id.clone(),
            Registration {
                secret: bootstrap.secret.clone(),
                affiliation: String::new(),
                attrs: Vec::new(),
                registrar: true,
            },
        );

        Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                signing_key: SigningKey::from_bytes(&seed),
                registrations: Mutex::new(registrations),
                register_log: Mutex::new(Vec::new()),
                register_calls: AtomicUsize::new(0),
                enroll_calls: AtomicUsize::new(0),
                reachable: AtomicBool::new(true),
                latency_ms: AtomicU64::new(0),
            }),
        }
    }

    pub fn for_organization(profile: &OrganizationProfile) -> Self {
        Self::new(&profile.ca.name, &profile.bootstrap)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.inner.signing_key.verifying_key()
    }

    pub fn register_calls(&self) -> usize {
        self.inner.register_calls.load(Ordering::SeqCst)
    }

    pub fn enroll_calls(&self) -> usize {
        self.inner.enroll_calls.load(Ordering::SeqCst)
    }

    /// Every register request received, in arrival order.
    pub async fn register_requests(&self) -> Vec<RegisterRequest> {
        self.inner.register_log.lock().await.clone()
    }

    /// Simulates the CA going offline (or coming back).
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Adds a fixed delay to every call.
    pub fn set_latency(&self, latency: Duration) {
        self.inner.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Decodes a certificate issued by this CA.
    pub fn inspect(&self, certificate: &str) -> Result<CertificateBody, CaError> {
        certificate::verify(certificate, &self.verifying_key())
    }

    async fn simulate_transport(&self) -> Result<(), CaError> {
        let latency = self.inner.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if !self.inner.reachable.load(Ordering::SeqCst) {
            return Err(CaError::Transport(format!("connect ECONNREFUSED {}", self.inner.name)));
        }
        Ok(())
    }

    fn new_secret() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SECRET_LEN)
            .map(char::from)
            .collect()
    }
}

#[async_trait]
impl CaService for DevCertificateAuthority {
    async fn register(&self, request: &RegisterRequest, registrar: &Identity) -> Result<String, CaError> {
        self.inner.register_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_transport().await?;
        self.inner.register_log.lock().await.push(request.clone());

        let acting = self.inspect(registrar.certificate()).map_err(|_| {
            CaError::Rejected("Authentication failure: registrar certificate not issued by this CA".to_string())
        })?;

        if request.enrollment_id.is_empty() {
            return Err(CaError::Rejected("Missing enrollment ID".to_string()));
        }
        if request.affiliation.is_empty() {
            return Err(CaError::Rejected("Missing affiliation".to_string()));
        }
        if let Some(bad) = request.attrs.iter().find(|a| a.name.is_empty()) {
            return Err(CaError::Rejected(format!("Malformed attribute with value '{}'", bad.value)));
        }

        let mut registrations = self.inner.registrations.lock().await;

        let may_register = registrations
            .get(&acting.subject)
            .map(|r| r.registrar)
            .unwrap_or(false);
        if !may_register {
            return Err(CaError::Rejected(format!(
                "Identity '{}' does not have authority to register identities",
                acting.subject
            )));
        }

        if registrations.contains_key(&request.enrollment_id) {
            return Err(CaError::Rejected(format!(
                "Identity '{}' is already registered",
                request.enrollment_id
            )));
        }

        let secret = Self::new_secret();
        registrations.insert(
            request.enrollment_id.clone(),
            Registration {
                secret: secret.clone(),
                affiliation: request.affiliation.clone(),
                attrs: request.attrs.clone(),
                registrar: false,
            },
        );

        tracing::debug!("[{}] registered {}", self.inner.name, request.enrollment_id);
        Ok(secret)
    }

    async fn enroll(&self, request: &EnrollRequest) -> Result<Enrollment, CaError> {
        self.inner.enroll_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_transport().await?;

        let registration = {
            let registrations = self.inner.registrations.lock().await;
            match registrations.get(&request.enrollment_id) {
                Some(r) if r.secret == request.enrollment_secret => r.clone(),
                _ => {
                    return Err(CaError::Rejected(format!(
                        "Authentication failure for '{}'",
                        request.enrollment_id
                    )))
                }
            }
        };

        let key = SigningKey::generate(&mut OsRng);
        let mut serial = [0u8; 16];
        OsRng.fill_bytes(&mut serial);

        let body = CertificateBody {
            serial: hex::encode(serial),
            subject: request.enrollment_id.clone(),
            issuer: self.inner.name.clone(),
            affiliation: registration.affiliation,
            attrs: registration.attrs.into_iter().filter(|a| a.ecert).collect(),
            public_key: hex::encode(key.verifying_key().to_bytes()),
            not_before: chrono::Utc::now().to_rfc3339(),
        };

        let certificate = certificate::issue(body, &self.inner.signing_key)?;
        let private_key = pem::armor("PRIVATE KEY", &key.to_bytes());

        tracing::debug!("[{}] enrolled {}", self.inner.name, request.enrollment_id);
        Ok(Enrollment { certificate, private_key })
    }
}

impl std::fmt::Debug for DevCertificateAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevCertificateAuthority")
            .field("name", &self.inner.name)
            .finish()
    }
}
