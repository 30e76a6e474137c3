use std::collections::HashMap;
use std::sync::Arc;

use ledgerid_common::{GatewayError, OrganizationRegistry, Result};

use crate::{FileSystemWallet, IdentityStore, InMemoryWallet};

/// One identity store per organization.
#[derive(Clone, Default)]
pub struct WalletSet {
    stores: HashMap<String, Arc<dyn IdentityStore>>,
}

impl WalletSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the on-disk wallet directory of every registered organization.
    pub async fn open_file_backed(registry: &OrganizationRegistry) -> Result<Self> {
        let mut set = Self::new();
        for org in registry.ids() {
            let profile = registry.resolve(&org)?;
            let wallet = FileSystemWallet::open(&profile.wallet_path).await?;
            set.insert(org, Arc::new(wallet));
        }
        Ok(set)
    }

    pub fn in_memory(registry: &OrganizationRegistry) -> Self {
        let mut set = Self::new();
        for org in registry.ids() {
            set.insert(org, Arc::new(InMemoryWallet::new()));
        }
        set
    }

    pub fn insert(&mut self, org: impl Into<String>, store: Arc<dyn IdentityStore>) {
        self.stores.insert(org.into(), store);
    }

    pub fn get(&self, org: &str) -> Result<Arc<dyn IdentityStore>> {
        self.stores
            .get(org)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownOrganization(org.to_string()))
    }
}

impl std::fmt::Debug for WalletSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut orgs: Vec<&String> = self.stores.keys().collect();
        orgs.sort();
        f.debug_struct("WalletSet").field("organizations", &orgs).finish()
    }
}
