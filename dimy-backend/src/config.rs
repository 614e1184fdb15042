//! Backend CLI configuration (spec.md §6).

use clap::Parser;

/// Runs the contact-matching backend: accepts CBF/QBF uploads over TCP,
/// maintains a union-of-CBFs standing filter, and answers QBF queries.
#[derive(Debug, Parser)]
#[command(name = "dimy-backend", version, about)]
pub struct BackendConfig {
    /// TCP port to listen on.
    pub listen_port: u16,
}
