use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ledgerid_common::{GatewayError, Identity, Result};
use tokio::sync::RwLock;

use crate::store::{is_valid_label, IdentityStore};

/// Volatile wallet for development nodes and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWallet {
    identities: Arc<RwLock<HashMap<String, Identity>>>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl IdentityStore for InMemoryWallet {
    async fn get(&self, label: &str) -> Result<Option<Identity>> {
        Ok(self.identities.read().await.get(label).cloned())
    }

    async fn put(&self, label: &str, identity: &Identity) -> Result<()> {
        if !is_valid_label(label) {
            return Err(GatewayError::Storage(format!("Invalid wallet label '{}'", label)));
        }
        self.identities
            .write()
            .await
            .insert(label.to_string(), identity.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut labels: Vec<String> = self.identities.read().await.keys().cloned().collect();
        labels.sort();
        Ok(labels)
    }
}
