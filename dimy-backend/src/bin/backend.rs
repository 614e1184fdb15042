//! `dimy-backend` binary entry point, mirroring `dimy-node`'s binary shape:
//! init tracing, parse CLI, run, map errors to a process exit code.

use std::process::ExitCode;

use clap::Parser;
use dimy_backend::{BackendConfig, Standing, serve};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = BackendConfig::parse();
    let standing = Standing::new();

    match serve(config.listen_port, standing).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "backend exited with a fatal error");
            ExitCode::FAILURE
        }
    }
}
