#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use ledgerid::{IdentityManager, InMemoryLedger, TransactionGateway};
use ledgerid_ca::{CertificateAuthorityClient, DevCertificateAuthority};
use ledgerid_common::{ConnectionProfile, Deadlines, OrganizationConfig, OrganizationProfile, OrganizationRegistry};
use ledgerid_wallet::InMemoryWallet;
use serde_json::{json, Map, Value};

pub const ORGS: [&str; 2] = ["Org1", "Org2"];

pub struct Harness {
    pub cas: HashMap<String, DevCertificateAuthority>,
    pub wallets: HashMap<String, InMemoryWallet>,
    pub ledger: InMemoryLedger,
    pub gateway: TransactionGateway,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_deadlines(Deadlines::default())
    }

    pub fn with_deadlines(deadlines: Deadlines) -> Self {
        let profiles: Vec<OrganizationProfile> = ORGS.iter().map(|id| profile_for(id)).collect();
        let registry = Arc::new(OrganizationRegistry::from_profiles(profiles.clone()).unwrap());

        let mut cas = HashMap::new();
        let mut wallets = HashMap::new();
        let mut builder = IdentityManager::builder(registry).deadlines(&deadlines);
        for profile in &profiles {
            let ca = DevCertificateAuthority::for_organization(profile);
            let wallet = InMemoryWallet::new();
            let client = CertificateAuthorityClient::new(Arc::new(ca.clone()), profile.ca.clone(), deadlines.ca);
            builder = builder.organization(profile.id.clone(), Arc::new(wallet.clone()), client);
            cas.insert(profile.id.clone(), ca);
            wallets.insert(profile.id.clone(), wallet);
        }

        let ledger = InMemoryLedger::new();
        let gateway = TransactionGateway::new(builder.build().unwrap(), Arc::new(ledger.clone())).with_deadlines(deadlines);

        Self {
            cas,
            wallets,
            ledger,
            gateway,
        }
    }

    pub fn identities(&self) -> &IdentityManager {
        self.gateway.identities()
    }

    pub fn ca(&self, org: &str) -> &DevCertificateAuthority {
        &self.cas[org]
    }

    pub fn wallet(&self, org: &str) -> &InMemoryWallet {
        &self.wallets[org]
    }
}

pub fn profile_for(id: &str) -> OrganizationProfile {
    let config = OrganizationConfig::conventional(id, "/srv/ledgerid");
    let lower = id.to_lowercase();

    let mut authorities = Map::new();
    authorities.insert(
        config.ca_name.clone(),
        json!({
            "url": format!("https://localhost:7054/{}", lower),
            "caName": format!("ca-{}", lower),
            "tlsCACerts": { "pem": "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n" },
            "httpOptions": { "verify": false }
        }),
    );
    let connection = ConnectionProfile::from_value(json!({
        "name": format!("test-network-{}", lower),
        "version": "1.0.0",
        "certificateAuthorities": Value::Object(authorities),
    }))
    .unwrap();

    OrganizationProfile::from_parts(&config, connection).unwrap()
}
