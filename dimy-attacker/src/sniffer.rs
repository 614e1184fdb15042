//! Per-port passive UDP listener, grounded on
//! `examples/original_source/Attacker.py`'s `main`/`thread` (one
//! broadcast-enabled, reuse-address socket per sniffed port, logging every
//! received share) and `dimy-node`'s `share_io` for the socket2 setup
//! pattern.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use dimy_types::wire::BROADCAST_PACKET_LEN;
use dimy_types::BroadcastPacket;
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tracing::{info, warn};

use crate::tracker::Tracker;

/// Errors sniffing one location.
#[derive(Debug, Error)]
pub enum SnifferError {
    /// The socket for a sniffed port couldn't be created or bound.
    #[error("failed to bind sniffer socket on port {port}: {source}")]
    BindFailure {
        /// The port that failed to bind.
        port: u16,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

fn bind(port: u16) -> Result<tokio::net::UdpSocket, SnifferError> {
    let raw = (|| -> std::io::Result<Socket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_broadcast(true)?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
        socket.bind(&addr.into())?;
        Ok(socket)
    })()
    .map_err(|source| SnifferError::BindFailure { port, source })?;
    let raw: std::net::UdpSocket = raw.into();
    tokio::net::UdpSocket::from_std(raw).map_err(|source| SnifferError::BindFailure { port, source })
}

/// Binds `port` and sniffs forever, feeding every well-formed frame into the
/// shared `tracker`. Runs until the process is killed or the socket errors.
///
/// # Errors
/// Returns [`SnifferError::BindFailure`] if the socket can't be bound.
pub async fn sniff(port: u16, tracker: std::sync::Arc<tokio::sync::Mutex<Tracker>>) -> Result<(), SnifferError> {
    let socket = bind(port)?;
    info!(port, "sniffing");
    let mut buf = [0u8; BROADCAST_PACKET_LEN];
    loop {
        let (len, addr) = match socket.recv_from(&mut buf).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(port, %err, "sniffer socket error");
                continue;
            }
        };
        let Ok(packet) = BroadcastPacket::decode(&buf[..len]) else {
            warn!(port, "discarding malformed frame");
            continue;
        };
        let id = {
            let mut tracker = tracker.lock().await;
            tracker.observe(packet.hash, addr).to_string()
        };
        info!(
            port,
            idx = packet.idx,
            hash_prefix = %hex_prefix(&packet.hash),
            %addr,
            node = %id,
            "associated share with node"
        );
    }
}

fn hex_prefix(hash: &[u8; 32]) -> String {
    hash[..4].iter().map(|byte| format!("{byte:02x}")).collect()
}
