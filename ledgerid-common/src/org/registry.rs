use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::profile::ConnectionProfile;
use crate::error::{GatewayError, Result};

/// Default registrar credentials every CA is bootstrapped with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapCredentials {
    pub enrollment_id: String,
    pub secret: String,
}

impl Default for BootstrapCredentials {
    fn default() -> Self {
        Self {
            enrollment_id: "admin".to_string(),
            secret: "adminpw".to_string(),
        }
    }
}

/// Static configuration of one organization, as found in the node config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationConfig {
    pub id: String,
    pub msp_id: String,
    pub connection_profile: PathBuf,
    /// Key of this organization's CA under `certificateAuthorities`.
    pub ca_name: String,
    pub wallet_path: PathBuf,
    /// Affiliation used for standard-tier registrations.
    pub affiliation: String,
    #[serde(default)]
    pub bootstrap: BootstrapCredentials,
}

impl OrganizationConfig {
    /// Conventional settings for an `OrgN` deployment rooted at `base`.
    pub fn conventional(id: &str, base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let lower = id.to_lowercase();
        Self {
            id: id.to_string(),
            msp_id: format!("{}MSP", id),
            connection_profile: base.join("config").join(format!("connection-{}.json", lower)),
            ca_name: format!("ca.{}.example.com", lower),
            wallet_path: base.join(format!("{}-wallet", lower)),
            affiliation: format!("{}.department1", lower),
            bootstrap: BootstrapCredentials::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaEndpoint {
    pub name: String,
    pub url: String,
    pub ca_name: Option<String>,
    pub tls_ca_certs: Vec<String>,
    pub verify: bool,
}

/// Everything known about an organization after its profile has been loaded.
#[derive(Debug, Clone)]
pub struct OrganizationProfile {
    pub id: String,
    pub msp_id: String,
    pub wallet_path: PathBuf,
    pub affiliation: String,
    pub bootstrap: BootstrapCredentials,
    pub ca: CaEndpoint,
    pub connection: Arc<ConnectionProfile>,
}

impl OrganizationProfile {
    pub fn from_parts(config: &OrganizationConfig, connection: ConnectionProfile) -> Result<Self> {
        let entry = connection.certificate_authority(&config.ca_name).ok_or_else(|| {
            GatewayError::Config(format!(
                "Connection profile for {} has no certificate authority '{}'",
                config.id, config.ca_name
            ))
        })?;

        let ca = CaEndpoint {
            name: config.ca_name.clone(),
            url: entry.url.clone(),
            ca_name: entry.ca_name.clone(),
            tls_ca_certs: entry.tls_ca_certs.pem.to_vec(),
            verify: entry.http_options.verify,
        };

        Ok(Self {
            id: config.id.clone(),
            msp_id: config.msp_id.clone(),
            wallet_path: config.wallet_path.clone(),
            affiliation: config.affiliation.clone(),
            bootstrap: config.bootstrap.clone(),
            ca,
            connection: Arc::new(connection),
        })
    }
}

/// Closed mapping from organization identifier to its resolved profile.
///
/// Built once at startup and read-only afterwards, so it can be shared behind
/// an `Arc` and resolved from any task without locking.
#[derive(Debug, Clone, Default)]
pub struct OrganizationRegistry {
    organizations: HashMap<String, Arc<OrganizationProfile>>,
}

impl OrganizationRegistry {
    /// Loads every organization's connection profile from disk.
    pub fn load(configs: &[OrganizationConfig]) -> Result<Self> {
        let mut profiles = Vec::with_capacity(configs.len());
        for config in configs {
            let connection = ConnectionProfile::load_from_file(&config.connection_profile)?;
            profiles.push(OrganizationProfile::from_parts(config, connection)?);
        }
        Self::from_profiles(profiles)
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = OrganizationProfile>) -> Result<Self> {
        let mut organizations = HashMap::new();
        for profile in profiles {
            if organizations.contains_key(&profile.id) {
                return Err(GatewayError::Config(format!("Organization {} configured twice", profile.id)));
            }
            tracing::debug!("Registered organization {} ({})", profile.id, profile.msp_id);
            organizations.insert(profile.id.clone(), Arc::new(profile));
        }
        Ok(Self { organizations })
    }

    pub fn resolve(&self, org: &str) -> Result<Arc<OrganizationProfile>> {
        self.organizations
            .get(org)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownOrganization(org.to_string()))
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.organizations.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }
}
