use thiserror::Error;

/// Failure kinds surfaced by the identity manager and the transaction gateway.
///
/// Every variant carries a plain string payload so a single outcome can be
/// cloned and handed to every waiter of a shared (single-flight) operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The organization identifier is not part of the configured set.
    #[error("Unknown organization: {0}")]
    UnknownOrganization(String),

    /// Transport-level failure talking to the certificate authority.
    #[error("Certificate authority unreachable: {0}")]
    CaUnreachable(String),

    /// The certificate authority rejected a registration request.
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    /// The certificate authority rejected an enrollment request.
    #[error("Enrollment failed: {0}")]
    EnrollmentFailed(String),

    /// No dispatch entry exists for the requested chaincode function.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The dispatch entry exists but the positional arguments do not match its arity.
    #[error("Function '{function}' expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// An operation exceeded its deadline. The payload names the operation.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Wallet I/O or record decoding failure.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GatewayError {
    /// Whether a caller may reasonably retry the same request with backoff.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            GatewayError::CaUnreachable(_) | GatewayError::ConnectionFailed(_) | GatewayError::Timeout(_)
        )
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_kinds() {
        assert!(GatewayError::CaUnreachable("refused".into()).is_retriable());
        assert!(GatewayError::Timeout("ca.enroll".into()).is_retriable());
        assert!(GatewayError::ConnectionFailed("down".into()).is_retriable());
        assert!(!GatewayError::RegistrationFailed("dup".into()).is_retriable());
        assert!(!GatewayError::UnknownFunction("Nope".into()).is_retriable());
    }

    #[test]
    fn test_invalid_arguments_message() {
        let err = GatewayError::InvalidArguments {
            function: "UpdateUser".into(),
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Function 'UpdateUser' expects 2 argument(s), got 1");
    }
}
