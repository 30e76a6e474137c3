use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// `tlsCACerts.pem` may be a single PEM string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PemBundle {
    One(String),
    Many(Vec<String>),
}

impl PemBundle {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            PemBundle::One(pem) => vec![pem.clone()],
            PemBundle::Many(pems) => pems.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsCaCerts {
    pub pem: PemBundle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HttpOptions {
    #[serde(default)]
    pub verify: bool,
}

/// One entry of the profile's `certificateAuthorities` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaEntry {
    pub url: String,
    #[serde(default)]
    pub ca_name: Option<String>,
    #[serde(rename = "tlsCACerts")]
    pub tls_ca_certs: TlsCaCerts,
    #[serde(default)]
    pub http_options: HttpOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileSections {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    certificate_authorities: BTreeMap<String, CaEntry>,
}

/// Network connection profile for one organization.
///
/// The typed sections are what this crate reads; `raw` keeps the whole
/// document so it can be handed unchanged to the ledger network collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionProfile {
    pub name: Option<String>,
    pub certificate_authorities: BTreeMap<String, CaEntry>,
    pub raw: Value,
}

impl ConnectionProfile {
    pub fn from_value(raw: Value) -> Result<Self> {
        let sections: ProfileSections = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::Config(format!("Malformed connection profile: {}", e)))?;

        Ok(Self {
            name: sections.name,
            certificate_authorities: sections.certificate_authorities,
            raw,
        })
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(data)
            .map_err(|e| GatewayError::Config(format!("Connection profile is not JSON: {}", e)))?;
        Self::from_value(raw)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Config(format!("Cannot read connection profile {}: {}", path.display(), e)))?;
        Self::from_json(&data)
    }

    pub fn certificate_authority(&self, name: &str) -> Option<&CaEntry> {
        self.certificate_authorities.get(name)
    }
}
