use ledgerid_common::PermissionTier;

use crate::service::{Attribute, RegisterRequest};

/// Affiliation every READ-WRITE user is registered under, whatever their organization.
pub const PRIVILEGED_AFFILIATION: &str = "org1.department1";

pub const APPROVER_ROLE: &str = "approver";
pub const CLIENT_ROLE: &str = "client";

/// CA identity type used for every user registration.
const CA_IDENTITY_TYPE: &str = "client";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub affiliation: String,
    pub role: &'static str,
}

/// Maps a permission tier to CA-level authorization attributes.
///
/// | tier         | affiliation                  | role attribute |
/// |--------------|------------------------------|----------------|
/// | `READ-WRITE` | [`PRIVILEGED_AFFILIATION`]   | `approver`     |
/// | anything else| organization default         | `client`       |
pub fn role_assignment(tier: PermissionTier, default_affiliation: &str) -> RoleAssignment {
    match tier {
        PermissionTier::ReadWrite => RoleAssignment {
            affiliation: PRIVILEGED_AFFILIATION.to_string(),
            role: APPROVER_ROLE,
        },
        PermissionTier::Standard => RoleAssignment {
            affiliation: default_affiliation.to_string(),
            role: CLIENT_ROLE,
        },
    }
}

impl RoleAssignment {
    pub fn into_request(self, username: &str) -> RegisterRequest {
        RegisterRequest {
            enrollment_id: username.to_string(),
            affiliation: self.affiliation,
            role: CA_IDENTITY_TYPE.to_string(),
            attrs: vec![Attribute {
                name: "role".to_string(),
                value: self.role.to_string(),
                ecert: true,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_is_approver_under_fixed_affiliation() {
        for default in ["org1.department1", "org2.department1", "org9.department4"] {
            let assignment = role_assignment(PermissionTier::ReadWrite, default);
            assert_eq!(assignment.affiliation, PRIVILEGED_AFFILIATION);
            assert_eq!(assignment.role, APPROVER_ROLE);
        }
    }

    #[test]
    fn test_default_tier_is_client_under_org_affiliation() {
        let assignment = role_assignment(PermissionTier::Standard, "org2.department1");
        assert_eq!(assignment.affiliation, "org2.department1");
        assert_eq!(assignment.role, CLIENT_ROLE);
    }

    #[test]
    fn test_register_request_shape() {
        let request = role_assignment(PermissionTier::ReadWrite, "org2.department1").into_request("alice");

        assert_eq!(request.enrollment_id, "alice");
        assert_eq!(request.role, "client");
        assert_eq!(
            request.attrs,
            vec![Attribute { name: "role".into(), value: "approver".into(), ecert: true }]
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["enrollmentID"], "alice");
        assert_eq!(json["attrs"][0]["ecert"], true);
    }
}
