use ledgerid_common::GatewayError;
use thiserror::Error;

/// Errors reported by the ledger network collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Channel unavailable: {0}")]
    Channel(String),

    #[error("Submission error: {0}")]
    Submission(String),
}

impl From<NetworkError> for GatewayError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Connection(reason) | NetworkError::Channel(reason) => GatewayError::ConnectionFailed(reason),
            NetworkError::Submission(reason) => GatewayError::SubmissionFailed(reason),
        }
    }
}
