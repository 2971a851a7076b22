//! Per-client registry entry

use std::net::SocketAddr;
use std::time::Instant;

/// Unique identifier for a registered client
///
/// Assigned monotonically at registration, so iterating the registry's
/// ordered map visits clients in registration order.
pub type ClientId = u64;

/// Entry for a single registered client
///
/// Owns the connection's write half for the duration of the registration.
/// The read half stays with the servicing worker.
#[derive(Debug)]
pub struct ClientEntry<W> {
    /// Unique client id
    pub id: ClientId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// When the client was registered
    pub registered_at: Instant,

    /// Write half of the connection
    pub(super) writer: W,
}

impl<W> ClientEntry<W> {
    pub(super) fn new(id: ClientId, peer_addr: SocketAddr, writer: W) -> Self {
        Self {
            id,
            peer_addr,
            registered_at: Instant::now(),
            writer,
        }
    }
}
