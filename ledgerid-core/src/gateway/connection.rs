use std::sync::Arc;
use std::time::Duration;

use ledgerid_common::{with_deadline, ConnectionProfile, GatewayError, Result};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::network::traits::{ConnectOptions, LedgerGateway, LedgerNetwork};

/// A gateway connection owned by exactly one invocation.
///
/// `release` is the normal way out. If the guard is dropped while still
/// holding the connection (the invoking future was cancelled), the disconnect
/// is spawned onto the current runtime instead.
pub(crate) struct ScopedConnection {
    gateway: Option<Arc<dyn LedgerGateway>>,
    label: String,
    deadline: Duration,
}

impl ScopedConnection {
    pub(crate) async fn open(
        network: &dyn LedgerNetwork,
        profile: &ConnectionProfile,
        options: ConnectOptions,
        deadline: Duration,
    ) -> Result<Self> {
        let label = options.identity_label.clone();
        let gateway = with_deadline(deadline, "network.connect", async {
            network.connect(profile, options).await.map_err(GatewayError::from)
        })
        .await?;

        debug!("Opened gateway connection for {}", label);
        Ok(Self {
            gateway: Some(gateway),
            label,
            deadline,
        })
    }

    pub(crate) fn gateway(&self) -> Result<&Arc<dyn LedgerGateway>> {
        self.gateway
            .as_ref()
            .ok_or_else(|| GatewayError::ConnectionFailed("connection already released".to_string()))
    }

    /// Disconnects under the network deadline. A slow disconnect is logged, not returned.
    pub(crate) async fn release(mut self) {
        if let Some(gateway) = self.gateway.take() {
            match tokio::time::timeout(self.deadline, gateway.disconnect()).await {
                Ok(()) => debug!("Released gateway connection for {}", self.label),
                Err(_) => warn!(
                    "Disconnect for {} exceeded its deadline of {:?}",
                    self.label, self.deadline
                ),
            }
        }
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        let Some(gateway) = self.gateway.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(handle) => {
                debug!("Releasing abandoned gateway connection for {}", self.label);
                handle.spawn(async move { gateway.disconnect().await });
            }
            Err(_) => warn!("No runtime to release the gateway connection for {}", self.label),
        }
    }
}
