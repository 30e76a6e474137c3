use serde::{Deserialize, Serialize};

/// Wallet label reserved for the organization's registrar identity.
pub const ADMIN_LABEL: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityType {
    #[serde(rename = "X.509")]
    X509,
}

/// PEM-encoded certificate and private key issued at enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub certificate: String,
    pub private_key: String,
}

/// An enrolled identity as it is persisted in a wallet.
///
/// The serialized form is exactly the wallet record:
/// `{ credentials: { certificate, privateKey }, mspId, type: "X.509" }`.
/// The label is the wallet key and is not part of the record.
/// Values are never mutated after enrollment; re-enrolling produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub credentials: Credentials,
    pub msp_id: String,
    #[serde(rename = "type")]
    pub kind: IdentityType,
}

impl Identity {
    pub fn x509(certificate: impl Into<String>, private_key: impl Into<String>, msp_id: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                certificate: certificate.into(),
                private_key: private_key.into(),
            },
            msp_id: msp_id.into(),
            kind: IdentityType::X509,
        }
    }

    pub fn certificate(&self) -> &str {
        &self.credentials.certificate
    }

    pub fn private_key(&self) -> &str {
        &self.credentials.private_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_record_shape() {
        let identity = Identity::x509("-----BEGIN CERTIFICATE-----\nAAA\n-----END CERTIFICATE-----\n", "key", "Org1MSP");
        let value = serde_json::to_value(&identity).unwrap();

        assert_eq!(value["type"], "X.509");
        assert_eq!(value["mspId"], "Org1MSP");
        assert_eq!(value["credentials"]["privateKey"], "key");
        assert!(value["credentials"]["certificate"].as_str().unwrap().starts_with("-----BEGIN"));
    }

    #[test]
    fn test_rejects_unknown_identity_type() {
        let raw = r#"{"credentials":{"certificate":"c","privateKey":"k"},"mspId":"Org1MSP","type":"HSM-X.509"}"#;
        assert!(serde_json::from_str::<Identity>(raw).is_err());
    }
}
