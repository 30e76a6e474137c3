use std::sync::Arc;

use async_trait::async_trait;
use ledgerid_common::ConnectionProfile;
use ledgerid_wallet::IdentityStore;
use serde::{Deserialize, Serialize};

use super::error::NetworkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryOptions {
    pub enabled: bool,
    pub as_localhost: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            as_localhost: true,
        }
    }
}

/// Options for opening a gateway connection as one wallet identity.
#[derive(Clone)]
pub struct ConnectOptions {
    pub wallet: Arc<dyn IdentityStore>,
    pub identity_label: String,
    pub discovery: DiscoveryOptions,
}

/// Entry point of the ledger network collaborator.
#[async_trait]
pub trait LedgerNetwork: Send + Sync {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        options: ConnectOptions,
    ) -> Result<Arc<dyn LedgerGateway>, NetworkError>;
}

/// An open connection to the network.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn network(&self, channel: &str) -> Result<Arc<dyn ChannelNetwork>, NetworkError>;

    /// Releases the connection. Calling it more than once is harmless.
    async fn disconnect(&self);
}

pub trait ChannelNetwork: Send + Sync {
    fn contract(&self, chaincode: &str) -> Arc<dyn Contract>;
}

#[async_trait]
pub trait Contract: Send + Sync {
    /// Endorses, orders and commits `function(args...)`, returning the raw result bytes.
    async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, NetworkError>;
}
