#![deny(missing_docs)]
//! Passive sniffer that demonstrates the metadata leakage of broadcasting
//! shares in the clear: it never reconstructs an EphID, it only correlates
//! which ports and hash digests belong to the same physical node.

pub mod config;
pub mod sniffer;
pub mod tracker;

use std::sync::Arc;

pub use config::AttackerConfig;
pub use sniffer::{sniff, SnifferError};
pub use tracker::Tracker;

/// Spawns one sniffer task per configured port, sharing a single
/// correlation [`Tracker`] across all of them, and waits for the first one
/// to exit.
///
/// # Errors
/// Returns the first sniffer's error, if any task exits with one.
pub async fn run(config: AttackerConfig) -> Result<(), SnifferError> {
    let tracker = Arc::new(tokio::sync::Mutex::new(Tracker::new()));
    let mut tasks = Vec::new();
    for port in config.ports {
        let tracker = Arc::clone(&tracker);
        tasks.push(tokio::spawn(sniff(port, tracker)));
    }

    for task in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(_join_err) => {}
        }
    }
    Ok(())
}
