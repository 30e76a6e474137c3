//! In-process certificate authority for development nodes and tests.
//!
//! Issues ed25519 key pairs and PEM certificates signed by a CA key derived
//! from the CA name, so certificates it issued stay verifiable across restarts.

pub mod authority;
pub mod certificate;
pub mod pem;

pub use authority::DevCertificateAuthority;
pub use certificate::CertificateBody;
