//! Fixed pool of long-lived worker tasks
//!
//! Each worker loops forever: pull a connection from the handoff queue,
//! register its write half, relay everything it sends until it closes or
//! errors, then unregister and close it. A failed session never terminates
//! the worker; it goes straight back to the queue.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::queue::HandoffQueue;
use crate::registry::{ClientId, ClientRegistry};
use crate::server::ServerConfig;
use crate::stats::ServerStats;

/// Handoff queue item: an accepted connection and its peer address
pub type Handoff = (TcpStream, SocketAddr);

/// Queue type the server and workers share
pub type ConnectionQueue = HandoffQueue<Handoff>;

/// Registry type the server and workers share
pub type TcpClientRegistry = ClientRegistry<OwnedWriteHalf>;

/// Fixed set of worker tasks draining the handoff queue
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` permanent worker tasks.
    ///
    /// The tasks run for the life of the process; the returned pool only
    /// tracks their join handles.
    pub fn spawn(
        count: usize,
        queue: Arc<ConnectionQueue>,
        registry: Arc<TcpClientRegistry>,
        config: ServerConfig,
        stats: Arc<ServerStats>,
    ) -> Self {
        let handles = (0..count)
            .map(|worker_id| {
                let queue = Arc::clone(&queue);
                let registry = Arc::clone(&registry);
                let config = config.clone();
                let stats = Arc::clone(&stats);

                tracing::debug!(worker = worker_id, "starting worker");
                tokio::spawn(async move {
                    worker_loop(worker_id, queue, registry, config, stats).await;
                })
            })
            .collect();

        Self { handles }
    }

    /// Number of worker tasks in the pool
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the pool has no workers
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<ConnectionQueue>,
    registry: Arc<TcpClientRegistry>,
    config: ServerConfig,
    stats: Arc<ServerStats>,
) {
    loop {
        let (stream, peer_addr) = queue.dequeue().await;
        let (mut reader, writer) = stream.into_split();

        let id = match registry.register(writer, peer_addr).await {
            Ok(id) => id,
            Err(e) => {
                // Dropping both halves closes the socket.
                tracing::warn!(
                    worker = worker_id,
                    peer = %peer_addr,
                    error = %e,
                    "registration failed, dropping connection"
                );
                continue;
            }
        };

        tracing::info!(worker = worker_id, client_id = id, peer = %peer_addr, "servicing client");

        service(&mut reader, id, &registry, &config, &stats).await;

        registry.unregister(id).await;
        tracing::info!(worker = worker_id, client_id = id, peer = %peer_addr, "client closed");
    }
}

/// Relay loop for one client.
///
/// Reads chunks of at most `read_buffer_size` bytes and broadcasts each one
/// verbatim (plus the configured terminator byte, if any). Ends on
/// end-of-stream, read error, or a failed broadcast; all three only end this
/// client's session.
async fn service<R, W>(
    reader: &mut R,
    id: ClientId,
    registry: &ClientRegistry<W>,
    config: &ServerConfig,
    stats: &ServerStats,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    let mut buf = vec![0u8; config.read_buffer_size];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!(client_id = id, "client closed connection");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(client_id = id, error = %e, "read error");
                break;
            }
        };

        let mut payload = BytesMut::with_capacity(n + 1);
        payload.put_slice(&buf[..n]);
        if let Some(terminator) = config.message_terminator {
            payload.put_u8(terminator);
        }

        match registry.broadcast(id, &payload).await {
            Ok(delivered) => {
                stats.record_broadcast();
                tracing::trace!(client_id = id, bytes = payload.len(), delivered, "relayed chunk");
            }
            Err(e) => {
                stats.record_broadcast_failure();
                tracing::warn!(client_id = id, error = %e, "broadcast failed, ending session");
                break;
            }
        }
    }
}
