use clap::Parser;
use ledgerid_node::{
    build_runtime,
    cli::Cli,
    commands::{error_payload, execute},
    config::NodeConfig,
    setup::{ensure_config, install_panic_hook},
};
use tracing::{error, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Config (before logging, the log directory comes from it)
    let created = ensure_config(&cli.config)?;
    let config = NodeConfig::load_from_file(&cli.config)?;

    // 3. Logging
    std::fs::create_dir_all(&config.log_dir)?;
    install_panic_hook(config.log_dir.join(format!("crash-{}.log", config.node_name)));
    let file_appender = tracing_appender::rolling::never(&config.log_dir, format!("audit-{}.log", config.node_name));
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let audit_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target().starts_with("ledgerid")
        }));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,ledgerid=debug".into()),
        );

    tracing_subscriber::registry()
        .with(audit_layer)
        .with(stderr_layer)
        .init();

    info!("--- STARTING LEDGERID NODE {} ---", config.node_name);
    if created {
        info!("Generated default config at {}", cli.config.display());
    }
    info!("Config: {}", cli.config.display());

    // 4. Runtime
    let runtime = match build_runtime(config).await {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start node: {}", e);
            return Err(e.into());
        }
    };

    // 5. Command
    match execute(cli.command, &runtime).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            println!("{}", serde_json::to_string_pretty(&error_payload(&e))?);
            Err(e.into())
        }
    }
}
