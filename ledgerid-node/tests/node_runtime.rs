use ledgerid_common::GatewayError;
use ledgerid_node::{
    build_runtime,
    cli::Commands,
    commands::{error_payload, execute},
    config::NodeConfig,
    setup::ensure_config,
};

fn register(username: &str, org: &str, permission: Option<&str>) -> Commands {
    Commands::Register {
        username: username.to_string(),
        org: org.to_string(),
        permission: permission.map(str::to_string),
        name: "Alice".to_string(),
        password: "pw".to_string(),
        user_type: "lawyer".to_string(),
    }
}

fn invoke(function: &str, args: &[&str], username: &str, org: &str) -> Commands {
    Commands::Invoke {
        channel: None,
        chaincode: None,
        function: function.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        username: username.to_string(),
        org: org.to_string(),
        permission: None,
    }
}

#[tokio::test]
async fn test_ensure_config_generates_loadable_deployment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.json");

    assert!(ensure_config(&path).unwrap());
    assert!(!ensure_config(&path).unwrap());
    assert!(dir.path().join("config").join("connection-org1.json").exists());
    assert!(dir.path().join("config").join("connection-org2.json").exists());

    let config = NodeConfig::load_from_file(&path).unwrap();
    assert!(config.node_name.starts_with("node-"));

    let runtime = build_runtime(config).await.unwrap();
    assert_eq!(runtime.registry.ids(), vec!["Org1".to_string(), "Org2".to_string()]);
    assert!(dir.path().join("org1-wallet").is_dir());
}

#[tokio::test]
async fn test_register_invoke_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.json");
    ensure_config(&path).unwrap();
    let runtime = build_runtime(NodeConfig::load_from_file(&path).unwrap()).await.unwrap();

    let registered = execute(register("alice", "Org1", Some("READ-WRITE")), &runtime).await.unwrap();
    assert_eq!(registered["success"], true);
    assert_eq!(registered["message"], "alice enrolled Successfully");
    assert!(registered["secret"].is_string());
    assert!(registered["result"]["transactionId"].is_string());

    let invoked = execute(invoke("CreateLegalRecord", &["{\"id\":\"rec-1\"}"], "alice", "Org1"), &runtime)
        .await
        .unwrap();
    assert_eq!(invoked["result"]["transactionId"].as_str().unwrap().len(), 64);

    let status = execute(Commands::Status, &runtime).await.unwrap();
    let org1 = &status["organizations"][0];
    assert_eq!(org1["id"], "Org1");
    assert_eq!(org1["adminEnrolled"], true);
    assert_eq!(org1["identities"], serde_json::json!(["admin", "alice"]));
    assert_eq!(status["organizations"][1]["adminEnrolled"], false);
    assert_eq!(status["functions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_wallet_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.json");
    ensure_config(&path).unwrap();

    {
        let runtime = build_runtime(NodeConfig::load_from_file(&path).unwrap()).await.unwrap();
        execute(register("bob", "Org2", None), &runtime).await.unwrap();
    }

    let runtime = build_runtime(NodeConfig::load_from_file(&path).unwrap()).await.unwrap();

    let again = execute(register("bob", "Org2", None), &runtime).await.unwrap();
    assert_eq!(again["message"], "bob enrolled Successfully");
    assert!(again.get("secret").is_none());
    assert_eq!(runtime.authorities["Org2"].enroll_calls(), 0);

    // the persisted admin is still accepted as registrar by the restarted CA
    let carol = execute(register("carol", "Org2", None), &runtime).await.unwrap();
    assert!(carol["secret"].is_string());
    assert_eq!(runtime.authorities["Org2"].register_calls(), 1);
}

#[tokio::test]
async fn test_failures_are_reported_not_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.json");
    ensure_config(&path).unwrap();
    let runtime = build_runtime(NodeConfig::load_from_file(&path).unwrap()).await.unwrap();

    let err = execute(invoke("DropTable", &["x"], "alice", "Org1"), &runtime).await.unwrap_err();
    assert_eq!(err, GatewayError::UnknownFunction("DropTable".into()));
    assert_eq!(runtime.ledger.connect_attempts(), 0);

    let payload = error_payload(&err);
    assert_eq!(payload["success"], false);
    assert_eq!(payload["retriable"], false);

    let err = execute(register("dave", "Org7", None), &runtime).await.unwrap_err();
    assert_eq!(err, GatewayError::UnknownOrganization("Org7".into()));
}

#[tokio::test]
async fn test_missing_connection_profile_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.json");
    ensure_config(&path).unwrap();
    std::fs::remove_file(dir.path().join("config").join("connection-org2.json")).unwrap();

    let err = build_runtime(NodeConfig::load_from_file(&path).unwrap()).await.err().unwrap();
    assert!(matches!(err, GatewayError::Config(_)));
}
