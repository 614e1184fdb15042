#![deny(missing_docs)]
//! End-to-end test harness: spawns real [`dimy_node::NodeState`] and
//! [`dimy_backend`] instances as in-process tokio tasks talking over
//! loopback UDP/TCP, grounded on the teacher's `oprf-test` crate (which
//! spawns real `oprf-service`/`oprf-key-gen` processes for its
//! `tests/oprf_service_test_suite.rs` scenarios) — scaled down here to
//! in-process tasks since a DIMY node is a single async loop, not a
//! separate server binary with its own listener lifecycle to manage.

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dimy_node::{NodeConfig, NodeError, NodeState};
use tokio::task::JoinHandle;

/// Picks a currently-unused TCP/UDP port by binding and immediately
/// releasing a TCP socket on it. Inherently racy against other processes,
/// but sufficient for a single test process's own harness.
pub fn free_port() -> u16 {
    TcpListener::bind(("127.0.0.1", 0))
        .expect("bind an ephemeral port")
        .local_addr()
        .expect("local_addr")
        .port()
}

/// Writes `contents` to `dir/name` and returns the path, for use as a
/// node's `command_file_path`.
pub fn write_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write command script");
    path
}

/// Starts a backend on `port` as a background task. The task runs until
/// the test process exits; there is no graceful shutdown because spec.md's
/// backend has none (it's meant to run forever).
pub fn spawn_backend(port: u16) -> JoinHandle<std::io::Result<()>> {
    let standing = dimy_backend::Standing::new();
    tokio::spawn(async move { dimy_backend::serve(port, standing).await })
}

/// Starts one node as a background task, returning its completion handle.
///
/// # Panics
/// Panics if the node's command script fails to load; harness tests are
/// expected to pass well-formed scripts.
pub fn spawn_node(config: NodeConfig) -> JoinHandle<Result<(), NodeError>> {
    let mut node = NodeState::new(config).expect("valid node config and command script");
    tokio::spawn(async move { node.run().await })
}

/// A backend plus the port it listens on, bundled for convenience.
pub struct RunningBackend {
    /// The port the backend was bound to.
    pub port: u16,
    /// Handle to the backend's background task.
    pub handle: JoinHandle<std::io::Result<()>>,
}

/// Spawns a backend on a freshly chosen free port.
pub fn start_backend() -> RunningBackend {
    let port = free_port();
    let handle = spawn_backend(port);
    RunningBackend { port, handle }
}

/// Builds a [`NodeConfig`] pointed at `backend`, with the given command
/// script and share-drop/time-scale overrides.
pub fn node_config(
    backend: &RunningBackend,
    command_file_path: PathBuf,
    share_drop: f64,
    time_scale: f64,
) -> NodeConfig {
    NodeConfig {
        server_ip: "127.0.0.1".to_string(),
        server_port: backend.port,
        command_file_path,
        share_drop,
        time_scale,
    }
}

/// Convenience re-export so scenario tests don't need a separate import
/// for the type their harness functions return handles of.
pub type BackendStanding = Arc<dimy_backend::Standing>;
