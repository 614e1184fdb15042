//! Node CLI configuration (spec.md §6), grounded on the teacher's
//! `clap::Parser` + `env = "..."` style (`oprf-service`/`oprf-dev-client`
//! config structs).

use std::path::PathBuf;

use clap::Parser;

/// Runs one node: broadcasts and reconstructs EphIDs, rolls DBFs, and
/// periodically uploads a QBF (or CBF, while diagnosed positive) to the
/// backend named by `server_ip`/`server_port`.
#[derive(Debug, Parser)]
#[command(name = "dimy-node", version, about)]
pub struct NodeConfig {
    /// Backend host to upload combined filters to.
    pub server_ip: String,

    /// Backend TCP port to upload combined filters to.
    pub server_port: u16,

    /// Path to the line-delimited MOVE/WAIT/POSITIVE/STOP command script.
    pub command_file_path: PathBuf,

    /// Probability that a queued share is dropped instead of broadcast.
    #[arg(long, env = "DIMY_NODE_SHARE_DROP", default_value_t = 0.5)]
    pub share_drop: f64,

    /// Scales every scheduled interval; real sleep time is `interval /
    /// time_scale`. Not a protocol constant — purely a test-speedup knob.
    #[arg(long, env = "TIME_SCALE", default_value_t = 1.0)]
    pub time_scale: f64,
}
