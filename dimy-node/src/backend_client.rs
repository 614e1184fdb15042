//! TCP upload client (spec.md §4.7, §4.8, §6), grounded on
//! `examples/original_source/client.py`'s `contact_backend`: connect, send
//! the 3-byte type tag then the fixed-size filter, read one response line.

use dimy_core::BloomFilter;
use dimy_types::UploadKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::NodeError;

/// Uploads `filter` to the backend at `addr`, tagged as `kind`, and returns
/// the backend's one-line ASCII response.
///
/// # Errors
/// Returns [`NodeError::ConnectFailure`] if the connection or any I/O step
/// fails; per spec.md §7 this is logged and the upload skipped, not fatal.
pub async fn upload(
    addr: (&str, u16),
    kind: UploadKind,
    filter: &BloomFilter,
) -> Result<String, NodeError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(NodeError::ConnectFailure)?;
    stream
        .write_all(kind.as_tag())
        .await
        .map_err(NodeError::ConnectFailure)?;
    stream
        .write_all(&filter.to_bytes())
        .await
        .map_err(NodeError::ConnectFailure)?;
    stream.shutdown().await.map_err(NodeError::ConnectFailure)?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .map_err(NodeError::ConnectFailure)?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}
