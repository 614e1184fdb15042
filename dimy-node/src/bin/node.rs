//! `dimy-node` binary entry point, grounded on the teacher's
//! `oprf-service-example.rs` `main` shape (init tracing, parse CLI, run,
//! map errors to a process exit code), swapping its internal
//! `nodes_observability::install_tracing` helper for a direct
//! `tracing_subscriber::fmt()...init()` call as in
//! `logannye-tinyzkp`'s `tinyzkp_api.rs` binary.

use std::process::ExitCode;

use clap::Parser;
use dimy_node::{NodeConfig, NodeError, NodeState};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::parse();
    let mut node = match NodeState::new(config) {
        Ok(node) => node,
        Err(err) => {
            tracing::error!(%err, "failed to start node");
            return ExitCode::FAILURE;
        }
    };

    match node.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(NodeError::ProgramStop) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "node exited with a fatal error");
            ExitCode::FAILURE
        }
    }
}
