//! Backend error kinds (spec.md §7): both close the connection without a
//! reply, so this lives here purely for logging purposes, not control flow.

use thiserror::Error;

/// Errors in one client connection's framing.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The connection closed (or errored) before a complete frame arrived.
    #[error("short read: expected {expected} bytes, got {got}")]
    WireTooShort {
        /// Bytes expected.
        expected: usize,
        /// Bytes actually read before the connection ended.
        got: usize,
    },
    /// The 3-byte type tag was neither `"CBF"` nor `"QBF"`.
    #[error(transparent)]
    BadTypeTag(#[from] dimy_types::error::WireError),
    /// An I/O error occurred while reading or writing the socket.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
