use std::collections::BTreeMap;
use std::sync::Arc;

use ledgerid::{IdentityManager, InMemoryLedger, TransactionGateway};
use ledgerid_ca::{CertificateAuthorityClient, DevCertificateAuthority};
use ledgerid_common::{OrganizationRegistry, Result};
use ledgerid_wallet::WalletSet;

use crate::config::NodeConfig;

/// Everything a node needs to serve registrations and invocations.
pub struct NodeRuntime {
    pub config: NodeConfig,
    pub registry: Arc<OrganizationRegistry>,
    pub wallets: WalletSet,
    pub authorities: BTreeMap<String, DevCertificateAuthority>,
    pub ledger: InMemoryLedger,
    pub gateway: TransactionGateway,
}

/// Loads every organization profile, opens the file wallets and wires the
/// development CA and ledger behind the gateway.
pub async fn build_runtime(config: NodeConfig) -> Result<NodeRuntime> {
    let registry = Arc::new(OrganizationRegistry::load(&config.organizations)?);
    tracing::info!("Loaded {} organization(s): {:?}", registry.len(), registry.ids());

    let wallets = WalletSet::open_file_backed(&registry).await?;

    let mut authorities = BTreeMap::new();
    let mut identities = IdentityManager::builder(registry.clone()).deadlines(&config.deadlines);
    for org in registry.ids() {
        let profile = registry.resolve(&org)?;
        let ca = DevCertificateAuthority::for_organization(&profile);
        let client = CertificateAuthorityClient::new(Arc::new(ca.clone()), profile.ca.clone(), config.deadlines.ca);

        tracing::debug!("{} -> CA {} at {}, wallet {}", org, profile.ca.name, profile.ca.url, profile.wallet_path.display());
        identities = identities.organization(org.clone(), wallets.get(&org)?, client);
        authorities.insert(org, ca);
    }

    let ledger = InMemoryLedger::new();
    let gateway = TransactionGateway::new(identities.build()?, Arc::new(ledger.clone()))
        .with_deadlines(config.deadlines)
        .with_discovery(config.discovery);

    Ok(NodeRuntime {
        config,
        registry,
        wallets,
        authorities,
        ledger,
        gateway,
    })
}
