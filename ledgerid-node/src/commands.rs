use ledgerid::{RegistrationRequest, TransactionRequest, UserAttributes};
use ledgerid_common::{GatewayError, PermissionTier, Result, ADMIN_LABEL};
use serde_json::{json, Value};

use crate::cli::Commands;
use crate::runtime::NodeRuntime;

/// Runs one CLI command against a built runtime and returns its JSON response.
pub async fn execute(command: Commands, runtime: &NodeRuntime) -> Result<Value> {
    match command {
        Commands::Init | Commands::Status => status(runtime).await,
        Commands::Register {
            username,
            org,
            permission,
            name,
            password,
            user_type,
        } => {
            let request = RegistrationRequest::requested(username, org, permission).with_attributes(UserAttributes {
                name,
                password,
                user_type,
            });
            let registration = runtime
                .gateway
                .register_user(&request, &runtime.config.channel, &runtime.config.chaincode)
                .await?;
            Ok(serde_json::to_value(registration)?)
        }
        Commands::Invoke {
            channel,
            chaincode,
            function,
            args,
            username,
            org,
            permission,
        } => {
            let mut request = TransactionRequest::new(
                channel.unwrap_or_else(|| runtime.config.channel.clone()),
                chaincode.unwrap_or_else(|| runtime.config.chaincode.clone()),
                function,
                args,
                username,
                org,
            );
            request.permission = permission.as_deref().map(PermissionTier::from);
            let result = runtime.gateway.invoke(&request).await?;
            Ok(serde_json::to_value(result)?)
        }
    }
}

async fn status(runtime: &NodeRuntime) -> Result<Value> {
    let mut organizations = Vec::new();
    for org in runtime.registry.ids() {
        let profile = runtime.registry.resolve(&org)?;
        let wallet = runtime.wallets.get(&org)?;
        let labels = wallet.list().await?;

        organizations.push(json!({
            "id": profile.id,
            "mspId": profile.msp_id,
            "ca": { "name": profile.ca.name, "url": profile.ca.url },
            "wallet": profile.wallet_path.display().to_string(),
            "adminEnrolled": labels.iter().any(|label| label == ADMIN_LABEL),
            "identities": labels,
        }));
    }

    Ok(json!({
        "node": runtime.config.node_name,
        "generatedAt": chrono::Utc::now().to_rfc3339(),
        "organizations": organizations,
        "functions": runtime.gateway.dispatch().functions().map(|(name, shape)| json!({ "name": name, "arity": shape.arity })).collect::<Vec<_>>(),
    }))
}

/// The JSON body printed for a failed command.
pub fn error_payload(err: &GatewayError) -> Value {
    json!({
        "success": false,
        "error": err.to_string(),
        "retriable": err.is_retriable(),
    })
}
