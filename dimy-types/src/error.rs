//! Error kinds shared across crates (spec.md §7).

use thiserror::Error;

/// Errors in the wire-level framing of broadcast packets and TCP uploads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A broadcast frame wasn't exactly [`crate::wire::BROADCAST_PACKET_LEN`]
    /// bytes.
    #[error("short broadcast frame: expected {expected} bytes, got {got}")]
    ShortFrame {
        /// Expected frame length.
        expected: usize,
        /// Actual length received.
        got: usize,
    },
    /// A TCP upload's type tag was neither `"CBF"` nor `"QBF"`.
    #[error("bad upload type tag: {0:?}")]
    BadTypeTag([u8; 3]),
}
