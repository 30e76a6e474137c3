use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ledgerid-node")]
#[command(about = "Identity lifecycle manager and transaction gateway")]
pub struct Cli {
    /// Node config file; generated with defaults when missing
    #[arg(long, value_name = "FILE", default_value = "config/node.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the default config and sample connection profiles
    Init,
    /// Enroll a user and record them on the ledger
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        org: String,
        /// Permission tier, e.g. READ-WRITE
        #[arg(long)]
        permission: Option<String>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long = "type", default_value = "")]
        user_type: String,
    },
    /// Submit a chaincode transaction as a user
    Invoke {
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        chaincode: Option<String>,
        #[arg(long = "fcn")]
        function: String,
        /// Positional argument; repeat for each one
        #[arg(long = "arg")]
        args: Vec<String>,
        #[arg(long)]
        username: String,
        #[arg(long)]
        org: String,
        #[arg(long)]
        permission: Option<String>,
    },
    /// Show organizations, their CAs and stored identities
    Status,
}
