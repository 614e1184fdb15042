//! UDP broadcaster/listener (spec.md §4.5, §4.6, §6), grounded on
//! `examples/original_source/client.py`'s `sock_send`/`sock_recv` split:
//! `sock_send` is created once in `__init__` and broadcasts to whatever
//! `self.location` currently is, while `sock_recv` is torn down and rebuilt
//! on every `cmd_move`. The two sockets are kept separate here for the same
//! reason: a node's outgoing source port stays fixed for its whole lifetime
//! regardless of which location it broadcasts from, which is what lets an
//! outside observer correlate a node's traffic across locations (spec.md
//! §9).

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use dimy_types::wire::BROADCAST_PACKET_LEN;
use dimy_types::BroadcastPacket;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, warn};

use crate::error::NodeError;

const BROADCAST_ADDR: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 255);

fn bind_udp(port: u16, reuse_address: bool) -> std::io::Result<tokio::net::UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_broadcast(true)?;
    if reuse_address {
        socket.set_reuse_address(true)?;
    }
    socket.set_nonblocking(true)?;
    let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&addr.into())?;
    let socket: std::net::UdpSocket = socket.into();
    tokio::net::UdpSocket::from_std(socket)
}

/// The node's outgoing socket: bound once, to an OS-assigned ephemeral
/// port, when the node is created. Never rebound by `MOVE` (spec.md §4.9:
/// `MOVE` "rebinds the listener socket", not this one).
pub struct SendSocket {
    socket: tokio::net::UdpSocket,
}

impl SendSocket {
    /// Binds a fresh broadcast-enabled UDP socket on an ephemeral port.
    ///
    /// # Errors
    /// Returns [`NodeError::BindFailure`] if the socket can't be created or
    /// bound.
    pub fn bind() -> Result<Self, NodeError> {
        let socket =
            bind_udp(0, false).map_err(|source| NodeError::BindFailure { port: 0, source })?;
        Ok(Self { socket })
    }

    /// Broadcasts one share packet to `255.255.255.255:<location>`.
    pub async fn broadcast(&self, location: u16, packet: &BroadcastPacket) -> std::io::Result<()> {
        let dest = SocketAddr::V4(SocketAddrV4::new(BROADCAST_ADDR, location));
        self.socket.send_to(&packet.encode(), dest).await?;
        Ok(())
    }
}

/// The node's listener socket: rebuilt on every `MOVE`, bound to the port
/// named by that location (spec.md §4.9).
pub struct RecvSocket {
    socket: tokio::net::UdpSocket,
    port: u16,
}

impl RecvSocket {
    /// Binds a fresh non-blocking, broadcast-enabled, reuse-address UDP
    /// socket on `port`.
    ///
    /// # Errors
    /// Returns [`NodeError::BindFailure`] if the socket can't be created or
    /// bound.
    pub fn bind(port: u16) -> Result<Self, NodeError> {
        let socket =
            bind_udp(port, true).map_err(|source| NodeError::BindFailure { port, source })?;
        Ok(Self { socket, port })
    }

    /// The port this socket is currently bound to, i.e. the node's
    /// "location".
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Attempts to receive and decode at most one broadcast frame without
    /// blocking. Malformed frames are logged and discarded rather than
    /// surfaced as an error, matching the listener's "best effort" framing
    /// (spec.md §4.6 only prescribes handling of well-formed frames).
    pub fn try_recv(&self) -> Option<BroadcastPacket> {
        let mut buf = [0u8; BROADCAST_PACKET_LEN];
        match self.socket.try_recv(&mut buf) {
            Ok(len) => match BroadcastPacket::decode(&buf[..len]) {
                Ok(packet) => {
                    debug!(idx = packet.idx, "received share");
                    Some(packet)
                }
                Err(err) => {
                    warn!(%err, "discarding malformed broadcast frame");
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => None,
            Err(err) => {
                warn!(%err, "error polling broadcast socket");
                None
            }
        }
    }
}
