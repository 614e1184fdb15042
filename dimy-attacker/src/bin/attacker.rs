//! `dimy-attacker` binary entry point.

use std::process::ExitCode;

use clap::Parser;
use dimy_attacker::{run, AttackerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AttackerConfig::parse();
    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "attacker exited with a fatal error");
            ExitCode::FAILURE
        }
    }
}
