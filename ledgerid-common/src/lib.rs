pub mod deadline;
pub mod error;
pub mod identity;
pub mod org;
pub mod permission;

pub use deadline::{with_deadline, Deadlines};
pub use error::{GatewayError, Result};
pub use identity::{Credentials, Identity, IdentityType, ADMIN_LABEL};
pub use org::{
    profile::{CaEntry, ConnectionProfile},
    registry::{BootstrapCredentials, CaEndpoint, OrganizationConfig, OrganizationProfile, OrganizationRegistry},
};
pub use permission::PermissionTier;
