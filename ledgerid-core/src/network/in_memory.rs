use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use ledgerid_common::ConnectionProfile;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::error::NetworkError;
use super::traits::{ChannelNetwork, ConnectOptions, Contract, LedgerGateway, LedgerNetwork};

/// A transaction committed to the in-memory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedTransaction {
    pub tx_id: String,
    pub channel: String,
    pub chaincode: String,
    pub function: String,
    pub args: Vec<String>,
    pub identity_label: String,
    pub msp_id: String,
}

#[derive(Default)]
struct LedgerState {
    connect_attempts: AtomicUsize,
    disconnects: AtomicUsize,
    sequence: AtomicU64,
    refuse_connections: AtomicBool,
    latency_ms: AtomicU64,
    submission_failure: Mutex<Option<String>>,
    channels: Mutex<Option<HashSet<String>>>,
    transactions: Mutex<Vec<SubmittedTransaction>>,
}

impl LedgerState {
    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-local stand-in for the ledger network.
///
/// Connections authenticate against the wallet passed in `ConnectOptions`;
/// submissions are recorded in order and answered with a SHA-256 transaction id.
/// Cloning shares the same ledger.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the ledger to the given channels. Any channel is accepted otherwise.
    pub fn restrict_channels<I, S>(&self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *LedgerState::lock(&self.state.channels) = Some(channels.into_iter().map(Into::into).collect());
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.state.disconnects.load(Ordering::SeqCst)
    }

    pub fn transactions(&self) -> Vec<SubmittedTransaction> {
        LedgerState::lock(&self.state.transactions).clone()
    }

    pub fn set_refuse_connections(&self, refuse: bool) {
        self.state.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Makes every submission fail with `reason` until cleared with `None`.
    pub fn set_submission_failure(&self, reason: Option<&str>) {
        *LedgerState::lock(&self.state.submission_failure) = reason.map(str::to_string);
    }

    /// Delays every submission.
    pub fn set_latency(&self, latency: Duration) {
        self.state.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerNetwork for InMemoryLedger {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        options: ConnectOptions,
    ) -> Result<Arc<dyn LedgerGateway>, NetworkError> {
        self.state.connect_attempts.fetch_add(1, Ordering::SeqCst);
        let network = profile.name.as_deref().unwrap_or("network");

        if self.state.refuse_connections.load(Ordering::SeqCst) {
            return Err(NetworkError::Connection(format!("{} refused the connection", network)));
        }

        let identity = options
            .wallet
            .get(&options.identity_label)
            .await
            .map_err(|e| NetworkError::Connection(e.to_string()))?
            .ok_or_else(|| {
                NetworkError::Connection(format!(
                    "Identity not found in wallet: {}",
                    options.identity_label
                ))
            })?;

        tracing::debug!(
            "{} connected to {} (discovery: {}, localhost: {})",
            options.identity_label,
            network,
            options.discovery.enabled,
            options.discovery.as_localhost
        );

        Ok(Arc::new(MemoryGateway {
            state: self.state.clone(),
            identity_label: options.identity_label,
            msp_id: identity.msp_id,
            closed: AtomicBool::new(false),
        }))
    }
}

struct MemoryGateway {
    state: Arc<LedgerState>,
    identity_label: String,
    msp_id: String,
    closed: AtomicBool,
}

#[async_trait]
impl LedgerGateway for MemoryGateway {
    async fn network(&self, channel: &str) -> Result<Arc<dyn ChannelNetwork>, NetworkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(NetworkError::Channel("Gateway has been disconnected".to_string()));
        }
        let known = LedgerState::lock(&self.state.channels)
            .as_ref()
            .map_or(true, |channels| channels.contains(channel));
        if !known {
            return Err(NetworkError::Channel(format!("Channel '{}' not found", channel)));
        }

        Ok(Arc::new(MemoryChannel {
            state: self.state.clone(),
            channel: channel.to_string(),
            identity_label: self.identity_label.clone(),
            msp_id: self.msp_id.clone(),
        }))
    }

    async fn disconnect(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct MemoryChannel {
    state: Arc<LedgerState>,
    channel: String,
    identity_label: String,
    msp_id: String,
}

impl ChannelNetwork for MemoryChannel {
    fn contract(&self, chaincode: &str) -> Arc<dyn Contract> {
        Arc::new(MemoryContract {
            state: self.state.clone(),
            channel: self.channel.clone(),
            chaincode: chaincode.to_string(),
            identity_label: self.identity_label.clone(),
            msp_id: self.msp_id.clone(),
        })
    }
}

struct MemoryContract {
    state: Arc<LedgerState>,
    channel: String,
    chaincode: String,
    identity_label: String,
    msp_id: String,
}

impl MemoryContract {
    fn tx_id(&self, sequence: u64, function: &str, args: &[String]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(sequence.to_be_bytes());
        hasher.update(self.channel.as_bytes());
        hasher.update(self.chaincode.as_bytes());
        hasher.update(function.as_bytes());
        for arg in args {
            hasher.update(arg.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl Contract for MemoryContract {
    async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, NetworkError> {
        let latency = self.state.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if let Some(reason) = LedgerState::lock(&self.state.submission_failure).clone() {
            return Err(NetworkError::Submission(reason));
        }

        let sequence = self.state.sequence.fetch_add(1, Ordering::SeqCst);
        let tx_id = self.tx_id(sequence, function, args);

        LedgerState::lock(&self.state.transactions).push(SubmittedTransaction {
            tx_id: tx_id.clone(),
            channel: self.channel.clone(),
            chaincode: self.chaincode.clone(),
            function: function.to_string(),
            args: args.to_vec(),
            identity_label: self.identity_label.clone(),
            msp_id: self.msp_id.clone(),
        });

        tracing::debug!("Committed {} {}:{} as {}", function, self.channel, self.chaincode, tx_id);
        Ok(tx_id.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use ledgerid_common::Identity;
    use ledgerid_wallet::{IdentityStore, InMemoryWallet};
    use serde_json::json;

    use super::*;
    use crate::network::traits::DiscoveryOptions;

    fn profile() -> ConnectionProfile {
        ConnectionProfile::from_value(json!({
            "name": "test-network-org1",
            "certificateAuthorities": {
                "ca.org1.example.com": { "url": "https://localhost:7054", "tlsCACerts": { "pem": "-----BEGIN CERTIFICATE-----" } }
            }
        }))
        .unwrap()
    }

    async fn options(label: &str) -> ConnectOptions {
        let wallet = InMemoryWallet::new();
        wallet
            .put("alice", &Identity::x509("CERT", "KEY", "Org1MSP"))
            .await
            .unwrap();
        ConnectOptions {
            wallet: Arc::new(wallet),
            identity_label: label.to_string(),
            discovery: DiscoveryOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_submit_records_transaction() {
        let ledger = InMemoryLedger::new();
        let gateway = ledger.connect(&profile(), options("alice").await).await.unwrap();
        let contract = gateway.network("mychannel").await.unwrap().contract("fabcar");

        let bytes = contract.submit_transaction("CreateUser", &["alice".to_string()]).await.unwrap();
        let tx_id = String::from_utf8(bytes).unwrap();
        assert_eq!(tx_id.len(), 64);

        let txs = ledger.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].tx_id, tx_id);
        assert_eq!(txs[0].msp_id, "Org1MSP");
        assert_eq!(txs[0].identity_label, "alice");
    }

    #[tokio::test]
    async fn test_unknown_identity_is_refused() {
        let ledger = InMemoryLedger::new();
        let err = ledger.connect(&profile(), options("bob").await).await.err().unwrap();
        assert!(matches!(err, NetworkError::Connection(_)));
        assert_eq!(ledger.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_counted_once_per_gateway() {
        let ledger = InMemoryLedger::new();
        let gateway = ledger.connect(&profile(), options("alice").await).await.unwrap();
        gateway.disconnect().await;
        gateway.disconnect().await;
        assert_eq!(ledger.disconnects(), 1);
        assert!(gateway.network("mychannel").await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_channel() {
        let ledger = InMemoryLedger::new();
        ledger.restrict_channels(["mychannel"]);
        let gateway = ledger.connect(&profile(), options("alice").await).await.unwrap();
        assert!(matches!(gateway.network("other").await.err(), Some(NetworkError::Channel(_))));
    }
}
