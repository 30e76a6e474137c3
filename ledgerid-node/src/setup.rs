use std::any::Any;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ledgerid_common::OrganizationConfig;
use serde_json::{json, Map, Value};

use crate::config::NodeConfig;

const SAMPLE_TLS_CA_CERT: &str = "-----BEGIN CERTIFICATE-----\nMIICJzCCAc2gAwIBAgIUaW5zZWN1cmUtZGV2LWNhLWNlcnQwCgYIKoZIzj0EAwIw\n-----END CERTIFICATE-----\n";

/// Writes a default config next to `path`, plus sample connection profiles
/// for any organization whose profile file is missing.
///
/// Returns `true` when a new config was generated.
pub fn ensure_config(path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if path.exists() {
        return Ok(false);
    }

    let base = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(base)?;

    let node_name = format!("node-{}", uuid::Uuid::new_v4().simple().to_string().get(..8).unwrap_or("local"));
    let config = NodeConfig::with_defaults(node_name, base);

    for (index, org) in config.organizations.iter().enumerate() {
        if org.connection_profile.exists() {
            continue;
        }
        if let Some(dir) = org.connection_profile.parent() {
            fs::create_dir_all(dir)?;
        }
        let profile = sample_connection_profile(org, index);
        fs::write(&org.connection_profile, serde_json::to_string_pretty(&profile)?)?;
    }

    config.save_to_file(path)?;
    Ok(true)
}

/// Appends a line per panic to `crash_log`, then defers to the previous hook.
pub fn install_panic_hook(crash_log: PathBuf) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());
        let line = format!("panic at {}: {}\n", location, panic_message(info.payload()));

        if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(&crash_log) {
            let _ = file.write_all(line.as_bytes());
        }
        previous(info);
    }));
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// A minimal connection profile in the layout the test network generates.
pub fn sample_connection_profile(org: &OrganizationConfig, index: usize) -> Value {
    let lower = org.id.to_lowercase();
    let ca_port = 7054 + 1000 * index;
    let peer = format!("peer0.{}.example.com", lower);

    let mut authorities = Map::new();
    authorities.insert(
        org.ca_name.clone(),
        json!({
            "url": format!("https://localhost:{}", ca_port),
            "caName": format!("ca-{}", lower),
            "tlsCACerts": { "pem": [SAMPLE_TLS_CA_CERT] },
            "httpOptions": { "verify": false }
        }),
    );

    let mut peers = Map::new();
    peers.insert(
        peer.clone(),
        json!({
            "url": format!("grpcs://localhost:{}", 7051 + 2000 * index),
            "tlsCACerts": { "pem": SAMPLE_TLS_CA_CERT },
            "grpcOptions": { "ssl-target-name-override": peer, "hostnameOverride": peer }
        }),
    );

    let mut organizations = Map::new();
    organizations.insert(
        org.id.clone(),
        json!({
            "mspid": org.msp_id,
            "peers": [peer],
            "certificateAuthorities": [org.ca_name]
        }),
    );

    json!({
        "name": format!("test-network-{}", lower),
        "version": "1.0.0",
        "client": {
            "organization": org.id,
            "connection": { "timeout": { "peer": { "endorser": "300" } } }
        },
        "organizations": Value::Object(organizations),
        "peers": Value::Object(peers),
        "certificateAuthorities": Value::Object(authorities)
    })
}

#[cfg(test)]
mod tests {
    use ledgerid_common::ConnectionProfile;

    use super::*;

    #[test]
    fn test_panic_message_from_payload() {
        let literal: Box<dyn Any + Send> = Box::new("wallet dir vanished");
        assert_eq!(panic_message(literal.as_ref()), "wallet dir vanished");

        let formatted: Box<dyn Any + Send> = Box::new(format!("org {} missing", "Org3"));
        assert_eq!(panic_message(formatted.as_ref()), "org Org3 missing");

        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_sample_profile_parses() {
        let org = OrganizationConfig::conventional("Org2", "/tmp/ledgerid");
        let profile = ConnectionProfile::from_value(sample_connection_profile(&org, 1)).unwrap();

        let ca = profile.certificate_authority("ca.org2.example.com").unwrap();
        assert_eq!(ca.url, "https://localhost:8054");
        assert_eq!(ca.ca_name.as_deref(), Some("ca-org2"));
        assert_eq!(ca.tls_ca_certs.pem.to_vec().len(), 1);
        assert!(!ca.http_options.verify);
    }
}
