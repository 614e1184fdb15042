#![deny(missing_docs)]
//! Contact-matching backend for the DIMY-style proximity-tracing protocol.
//!
//! Accepts TCP uploads of a node's combined filter, tagged either `"CBF"`
//! (merge into the standing positive-case filter) or `"QBF"` (query it).
//! There is exactly one standing filter, shared across every connection.

pub mod config;
pub mod error;

use std::sync::Arc;

use dimy_core::BloomFilter;
use dimy_types::constants::{FILTER_SIZE, HASH_ROUNDS};
use dimy_types::UploadKind;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, instrument, warn};

pub use config::BackendConfig;
pub use error::BackendError;

const REPLY_CBF_RECEIVED: &str = "Server: Contact Bloom Filter received.";
const REPLY_CONTACT_POSITIVE: &str = "Server: You have been in contact with a positive case.";
const REPLY_CONTACT_NEGATIVE: &str = "Server: No contact with a positive case was detected.";

/// Shared state: the union of every diagnosed node's combined filter.
#[derive(Default)]
pub struct Standing {
    filter: Mutex<BloomFilter>,
}

impl Standing {
    /// An empty standing filter.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            filter: Mutex::new(BloomFilter::new()),
        })
    }

    fn merge(&self, incoming: &BloomFilter) {
        let mut guard = self.filter.lock();
        if let Ok(merged) = guard.union(incoming) {
            *guard = merged;
        } else {
            warn!("dropped CBF upload with mismatched filter parameters");
        }
    }

    fn popcount_intersection(&self, incoming: &BloomFilter) -> usize {
        let guard = self.filter.lock();
        guard
            .intersect(incoming)
            .map(|intersection| intersection.popcount())
            .unwrap_or(0)
    }
}

/// Binds `listen_port` and serves connections until the process is killed.
///
/// # Errors
/// Returns an I/O error if the listener cannot be bound.
pub async fn serve(listen_port: u16, standing: Arc<Standing>) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", listen_port)).await?;
    info!(port = listen_port, "backend listening");
    loop {
        let (stream, peer) = listener.accept().await?;
        let standing = Arc::clone(&standing);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, &standing).await {
                warn!(%peer, %err, "connection closed without a valid upload");
            }
        });
    }
}

#[instrument(skip(stream, standing))]
async fn handle_connection(
    mut stream: TcpStream,
    standing: &Standing,
) -> Result<(), BackendError> {
    let mut tag = [0u8; 3];
    read_exact_or_short(&mut stream, &mut tag).await?;
    let kind = UploadKind::from_tag(&tag)?;

    let mut bytes = vec![0u8; FILTER_SIZE];
    read_exact_or_short(&mut stream, &mut bytes).await?;
    let filter = BloomFilter::from_bytes(&bytes);

    let reply = match kind {
        UploadKind::Cbf => {
            standing.merge(&filter);
            REPLY_CBF_RECEIVED
        }
        UploadKind::Qbf => {
            // A match requires every bit position a shared key sets, not
            // merely one incidental bit in common (spec.md §4.8/§8:
            // `popcount(standing ∩ client) >= HASH_ROUNDS`).
            if standing.popcount_intersection(&filter) >= HASH_ROUNDS {
                REPLY_CONTACT_POSITIVE
            } else {
                REPLY_CONTACT_NEGATIVE
            }
        }
    };

    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn read_exact_or_short(
    stream: &mut TcpStream,
    buf: &mut [u8],
) -> Result<(), BackendError> {
    let expected = buf.len();
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(BackendError::WireTooShort { expected, got: 0 })
        }
        Err(err) => Err(err.into()),
    }
}
