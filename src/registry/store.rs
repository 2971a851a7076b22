//! Client registry implementation
//!
//! Ordered map of active clients behind one lock, with atomic broadcast.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use super::config::{BroadcastScope, FailurePolicy, RegistryConfig};
use super::entry::{ClientEntry, ClientId};
use super::error::RegistryError;

/// Registry of active clients
///
/// Generic over the writer type so it can be driven by in-memory streams in
/// tests; the server instantiates it with `tokio::net::tcp::OwnedWriteHalf`.
///
/// All operations go through a single `tokio::sync::Mutex`, which is held
/// across the socket writes of [`broadcast`](Self::broadcast). Broadcasts
/// are therefore serialized: each one is delivered whole, to the set of
/// clients registered at call time, before the next one starts.
pub struct ClientRegistry<W> {
    /// Active clients, keyed by id (ids are monotonic, so iteration order
    /// is registration order)
    clients: Mutex<BTreeMap<ClientId, ClientEntry<W>>>,

    /// Next id to assign
    next_id: AtomicU64,

    /// Configuration
    config: RegistryConfig,
}

impl<W> ClientRegistry<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Create a registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            clients: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a client, taking ownership of its write half.
    ///
    /// Returns the id used for later [`broadcast`](Self::broadcast) and
    /// [`unregister`](Self::unregister) calls. Fails when the configured
    /// `max_clients` limit is reached; the caller is expected to drop the
    /// connection in that case.
    pub async fn register(
        &self,
        writer: W,
        peer_addr: SocketAddr,
    ) -> Result<ClientId, RegistryError> {
        let mut clients = self.clients.lock().await;

        if self.config.max_clients > 0 && clients.len() >= self.config.max_clients {
            return Err(RegistryError::AtCapacity {
                limit: self.config.max_clients,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        clients.insert(id, ClientEntry::new(id, peer_addr, writer));

        tracing::debug!(
            client_id = id,
            peer = %peer_addr,
            clients = clients.len(),
            "client registered"
        );

        Ok(id)
    }

    /// Unregister a client, dropping its write half.
    ///
    /// No-op if the id is not present, so concurrent removal is safe.
    pub async fn unregister(&self, id: ClientId) {
        let mut clients = self.clients.lock().await;

        if clients.remove(&id).is_some() {
            tracing::debug!(client_id = id, clients = clients.len(), "client unregistered");
        }
    }

    /// Broadcast a payload to registered clients.
    ///
    /// Writes the payload in full to each client in registration order,
    /// holding the registry lock for the entire fan-out. Whether `origin`
    /// receives its own message is governed by the configured
    /// [`BroadcastScope`].
    ///
    /// Under [`FailurePolicy::Abort`], the first failed write ends the
    /// broadcast and is returned as an error; clients later in the order
    /// receive nothing, and the failing client stays registered (its own
    /// worker will notice the broken socket and clean up). Under
    /// [`FailurePolicy::BestEffort`], every client is attempted and
    /// failures are only logged.
    ///
    /// Returns the number of clients the payload was delivered to.
    pub async fn broadcast(
        &self,
        origin: ClientId,
        payload: &[u8],
    ) -> Result<usize, RegistryError> {
        let mut clients = self.clients.lock().await;
        let mut delivered = 0;

        for (&id, entry) in clients.iter_mut() {
            if self.config.broadcast_scope == BroadcastScope::ExcludeSender && id == origin {
                continue;
            }

            match entry.writer.write_all(payload).await {
                Ok(()) => delivered += 1,
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(RegistryError::BroadcastWrite {
                            recipient: id,
                            source: e,
                        });
                    }
                    FailurePolicy::BestEffort => {
                        tracing::warn!(
                            client_id = id,
                            peer = %entry.peer_addr,
                            error = %e,
                            "broadcast write failed, skipping recipient"
                        );
                    }
                },
            }
        }

        tracing::trace!(
            origin = origin,
            bytes = payload.len(),
            delivered = delivered,
            "broadcast"
        );

        Ok(delivered)
    }

    /// Number of registered clients
    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }

    /// Ids of all registered clients, in registration order
    pub async fn client_ids(&self) -> Vec<ClientId> {
        self.clients.lock().await.keys().copied().collect()
    }
}

impl<W> Default for ClientRegistry<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn default() -> Self {
        Self::new()
    }
}
