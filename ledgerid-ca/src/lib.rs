pub mod client;
pub mod dev;
pub mod policy;
pub mod service;

pub use client::CertificateAuthorityClient;
pub use dev::DevCertificateAuthority;
pub use policy::{role_assignment, RoleAssignment, APPROVER_ROLE, CLIENT_ROLE, PRIVILEGED_AFFILIATION};
pub use service::{Attribute, CaError, CaService, EnrollRequest, Enrollment, RegisterRequest};
