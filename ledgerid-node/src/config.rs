use std::path::{Path, PathBuf};
use std::{fs, io};

use ledgerid::DiscoveryOptions;
use ledgerid_common::{Deadlines, OrganizationConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ORGANIZATIONS: [&str; 2] = ["Org1", "Org2"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_name: String,
    pub organizations: Vec<OrganizationConfig>,
    #[serde(default)]
    pub deadlines: Deadlines,
    #[serde(default)]
    pub discovery: DiscoveryOptions,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Channel and chaincode new users are recorded on.
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_chaincode")]
    pub chaincode: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_channel() -> String {
    "mychannel".to_string()
}

fn default_chaincode() -> String {
    "fabcar".to_string()
}

impl NodeConfig {
    /// Org1/Org2 deployment with every path rooted at `base`.
    pub fn with_defaults(node_name: impl Into<String>, base: &Path) -> Self {
        Self {
            node_name: node_name.into(),
            organizations: DEFAULT_ORGANIZATIONS
                .iter()
                .map(|id| OrganizationConfig::conventional(id, base))
                .collect(),
            deadlines: Deadlines::default(),
            discovery: DiscoveryOptions::default(),
            log_dir: base.join(default_log_dir()),
            channel: default_channel(),
            chaincode: default_chaincode(),
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        fs::write(path, json)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let parsed =
            serde_json::from_str::<NodeConfig>(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_org_conventions() {
        let config = NodeConfig::with_defaults("node-test", Path::new("/srv/ledgerid"));
        assert_eq!(config.organizations.len(), 2);

        let org2 = &config.organizations[1];
        assert_eq!(org2.id, "Org2");
        assert_eq!(org2.msp_id, "Org2MSP");
        assert_eq!(org2.ca_name, "ca.org2.example.com");
        assert_eq!(org2.affiliation, "org2.department1");
        assert_eq!(org2.wallet_path, PathBuf::from("/srv/ledgerid/org2-wallet"));
        assert_eq!(config.log_dir, PathBuf::from("/srv/ledgerid/logs"));
    }

    #[test]
    fn test_optional_sections_default() {
        let config: NodeConfig = serde_json::from_str(r#"{ "node_name": "n1", "organizations": [] }"#).unwrap();
        assert_eq!(config.deadlines, Deadlines::default());
        assert_eq!(config.discovery, DiscoveryOptions::default());
        assert_eq!(config.channel, "mychannel");
        assert_eq!(config.chaincode, "fabcar");
    }
}
