use std::collections::HashMap;
use std::sync::{MutexGuard, PoisonError};

use ledgerid_common::Result;
use tracing::{info, warn};

use super::invoke::TransactionGateway;
use super::types::{Registration, TransactionRequest, UserRecord};
use crate::flight::Role;
use crate::identity::types::RegistrationRequest;

const CREATE_USER: &str = "CreateUser";

impl TransactionGateway {
    /// Signs a user up: enrolls them and, on first enrollment, records them on the ledger.
    ///
    /// Returns the one-time registration secret and the `CreateUser` transaction
    /// for a new user. A user who is already enrolled and recorded gets the
    /// confirmation message only, as do callers that joined a sign-up already
    /// under way. If recording failed earlier, the next sign-up submits
    /// `CreateUser` again.
    pub async fn register_user(
        &self,
        request: &RegistrationRequest,
        channel: &str,
        chaincode: &str,
    ) -> Result<Registration> {
        let profile = self.identities().registry().resolve(&request.organization)?;
        let key = format!("{}/{}", profile.id, request.username);

        let gateway = self.clone();
        let request = request.clone();
        let channel = channel.to_string();
        let chaincode = chaincode.to_string();
        let flight_key = key.clone();
        let (role, registration) = self
            .signups
            .run_with_role(&flight_key, move || async move {
                gateway.sign_up(key, request, channel, chaincode).await
            })
            .await;

        match role {
            Role::Leader => registration,
            Role::Follower => registration.map(|r| Registration {
                success: r.success,
                message: r.message,
                secret: None,
                result: None,
            }),
        }
    }

    async fn sign_up(
        &self,
        key: String,
        request: RegistrationRequest,
        channel: String,
        chaincode: String,
    ) -> Result<Registration> {
        let outcome = self.identities().ensure_identity(&request).await?;

        let pending = self.unrecorded().get(&key).cloned();
        let secret = match outcome.secret {
            Some(secret) => secret,
            None => match pending {
                Some(secret) => {
                    info!("User {} of {} is enrolled but not yet on the ledger, retrying", request.username, request.organization);
                    secret
                }
                None => {
                    return Ok(Registration {
                        success: outcome.success,
                        message: outcome.message,
                        secret: None,
                        result: None,
                    })
                }
            },
        };

        let record = UserRecord::new(&request.username, &request.attributes, request.access.as_deref());
        let record = serde_json::to_string(&record)?;

        let create = TransactionRequest::new(
            channel,
            chaincode,
            CREATE_USER,
            vec![record],
            request.username.clone(),
            request.organization.clone(),
        )
        .with_permission(request.permission);

        let submitted = match self.invoke(&create).await {
            Ok(submitted) => submitted,
            Err(e) => {
                warn!("User {} of {} is enrolled but was not recorded: {}", request.username, request.organization, e);
                self.unrecorded().insert(key, secret);
                return Err(e);
            }
        };
        self.unrecorded().remove(&key);

        info!("Recorded new user {} of {} on the ledger", request.username, request.organization);
        Ok(Registration {
            success: outcome.success,
            message: outcome.message,
            secret: Some(secret),
            result: Some(submitted.result),
        })
    }

    fn unrecorded(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.unrecorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
