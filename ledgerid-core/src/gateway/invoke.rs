use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ledgerid_common::{with_deadline, Deadlines, GatewayError, Result};
use tracing::{info, warn};

use super::connection::ScopedConnection;
use super::dispatch::{DispatchTable, FunctionShape};
use super::types::{Registration, SubmitResult, TransactionRequest, TransactionResult};
use crate::flight::SingleFlight;
use crate::identity::manager::IdentityManager;
use crate::network::traits::{ConnectOptions, DiscoveryOptions, LedgerNetwork};

/// Submits chaincode transactions on behalf of enrolled users.
///
/// Each invocation makes sure the acting user is enrolled, opens its own
/// connection, submits through the dispatch table and disconnects on every
/// exit path.
#[derive(Clone)]
pub struct TransactionGateway {
    identities: IdentityManager,
    network: Arc<dyn LedgerNetwork>,
    dispatch: Arc<DispatchTable>,
    deadlines: Deadlines,
    discovery: DiscoveryOptions,
    // keyed by "<organization>/<username>"
    pub(super) signups: Arc<SingleFlight<Registration>>,
    // enrolled users whose CreateUser never made it onto the ledger, with their secret
    pub(super) unrecorded: Arc<Mutex<HashMap<String, String>>>,
}

impl TransactionGateway {
    pub fn new(identities: IdentityManager, network: Arc<dyn LedgerNetwork>) -> Self {
        Self {
            identities,
            network,
            dispatch: Arc::new(DispatchTable::standard()),
            deadlines: Deadlines::default(),
            discovery: DiscoveryOptions::default(),
            signups: Arc::new(SingleFlight::new()),
            unrecorded: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchTable) -> Self {
        self.dispatch = Arc::new(dispatch);
        self
    }

    pub fn with_deadlines(mut self, deadlines: Deadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryOptions) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn identities(&self) -> &IdentityManager {
        &self.identities
    }

    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    /// Runs `request.function(request.args...)` as `request.username`.
    ///
    /// Unknown functions and arity mismatches are rejected before the user is
    /// enrolled or any connection is opened.
    pub async fn invoke(&self, request: &TransactionRequest) -> Result<TransactionResult> {
        let profile = self.identities.registry().resolve(&request.organization)?;
        let shape = self.dispatch.resolve(&request.function, &request.args)?;

        self.identities.ensure_identity(&request.registration()).await?;

        let options = ConnectOptions {
            wallet: self.identities.wallet(&profile.id)?,
            identity_label: request.username.clone(),
            discovery: self.discovery,
        };
        let connection =
            ScopedConnection::open(self.network.as_ref(), &profile.connection, options, self.deadlines.network).await?;

        let outcome = self.submit(&connection, request, shape).await;
        connection.release().await;

        match &outcome {
            Ok(result) => info!(
                "{} submitted {} on {}/{} as {}",
                request.username, request.function, request.channel, request.chaincode, result.result.transaction_id
            ),
            Err(e) => warn!("{} failed to submit {}: {}", request.username, request.function, e),
        }
        outcome
    }

    async fn submit(
        &self,
        connection: &ScopedConnection,
        request: &TransactionRequest,
        shape: FunctionShape,
    ) -> Result<TransactionResult> {
        let gateway = connection.gateway()?;
        let limit = self.deadlines.network;

        let network = with_deadline(limit, "network.channel", async {
            gateway.network(&request.channel).await.map_err(GatewayError::from)
        })
        .await?;
        let contract = network.contract(&request.chaincode);

        let args = &request.args[..shape.arity];
        let raw = with_deadline(limit, "network.submit", async {
            contract
                .submit_transaction(&request.function, args)
                .await
                .map_err(GatewayError::from)
        })
        .await?;

        Ok(TransactionResult {
            message: format!("Transaction {} has been submitted", request.function),
            result: SubmitResult {
                transaction_id: String::from_utf8_lossy(&raw).into_owned(),
            },
        })
    }
}

impl std::fmt::Debug for TransactionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionGateway")
            .field("identities", &self.identities)
            .field("dispatch", &self.dispatch)
            .field("deadlines", &self.deadlines)
            .field("discovery", &self.discovery)
            .finish()
    }
}
