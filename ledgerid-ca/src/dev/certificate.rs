use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use super::pem;
use crate::service::{Attribute, CaError};

const PEM_LABEL: &str = "CERTIFICATE";

/// Signed content of a development certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateBody {
    pub serial: String,
    pub subject: String,
    pub issuer: String,
    pub affiliation: String,
    pub attrs: Vec<Attribute>,
    /// Hex-encoded ed25519 public key of the subject.
    pub public_key: String,
    /// RFC 3339 issuance time.
    pub not_before: String,
}

impl CertificateBody {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Serialize, Deserialize)]
struct SignedCertificate {
    body: CertificateBody,
    signature: String,
}

pub fn issue(body: CertificateBody, ca_key: &SigningKey) -> Result<String, CaError> {
    let message = serde_json::to_vec(&body).map_err(|e| CaError::Rejected(e.to_string()))?;
    let signature = ca_key.sign(&message);

    let signed = SignedCertificate {
        body,
        signature: hex::encode(signature.to_bytes()),
    };
    let der = serde_json::to_vec(&signed).map_err(|e| CaError::Rejected(e.to_string()))?;

    Ok(pem::armor(PEM_LABEL, &der))
}

/// Decodes `certificate` and checks it was signed by `ca_key`.
pub fn verify(certificate: &str, ca_key: &VerifyingKey) -> Result<CertificateBody, CaError> {
    let invalid = |why: &str| CaError::Rejected(format!("Invalid certificate: {}", why));

    let der = pem::dearmor(PEM_LABEL, certificate).ok_or_else(|| invalid("not PEM"))?;
    let signed: SignedCertificate = serde_json::from_slice(&der).map_err(|_| invalid("undecodable"))?;

    let signature_bytes = hex::decode(&signed.signature).map_err(|_| invalid("bad signature encoding"))?;
    let signature = Signature::from_slice(&signature_bytes).map_err(|_| invalid("bad signature length"))?;
    let message = serde_json::to_vec(&signed.body).map_err(|_| invalid("unserializable"))?;

    ca_key
        .verify(&message, &signature)
        .map_err(|_| invalid("signature mismatch"))?;

    Ok(signed.body)
}
