pub mod cli;
pub mod commands;
pub mod config;
pub mod runtime;
pub mod setup;

pub use config::NodeConfig;
pub use runtime::{build_runtime, NodeRuntime};
