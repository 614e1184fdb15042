//! Node error kinds (spec.md §7).

use thiserror::Error;

/// Errors the node runtime can raise; see spec.md §7 for the policy
/// attached to each.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A UDP socket failed to bind: either the node's persistent send
    /// socket at startup, or the listener socket `MOVE` rebinds. Fatal: the
    /// node exits non-zero.
    #[error("failed to bind udp socket on port {port}")]
    BindFailure {
        /// The port the `MOVE` command requested.
        port: u16,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A backend TCP upload couldn't connect. Logged and skipped; the node
    /// relies on the next periodic tick.
    #[error("failed to connect to backend for upload")]
    ConnectFailure(#[source] std::io::Error),

    /// The command script was empty, didn't start with `MOVE`, or contained
    /// an unparseable line.
    #[error("malformed command file: {0}")]
    MalformedCommandFile(String),

    /// Raised by the `STOP` command; unwinds the scheduler for an orderly
    /// shutdown. Not a failure.
    #[error("program stop requested")]
    ProgramStop,
}
