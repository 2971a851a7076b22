//! Chat relay server
//!
//! Owns the accept loop and wires the queue, registry, and worker pool
//! together. The queue and registry are constructed here and handed to the
//! pool explicitly, so several independent servers can coexist in one
//! process.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::error::Result;
use crate::queue::HandoffQueue;
use crate::registry::ClientRegistry;
use crate::server::config::ServerConfig;
use crate::stats::ServerStats;
use crate::worker::{ConnectionQueue, TcpClientRegistry, WorkerPool};

/// TCP chat relay server
pub struct ChatServer {
    config: ServerConfig,
    listener: TcpListener,
    queue: Arc<ConnectionQueue>,
    registry: Arc<TcpClientRegistry>,
    stats: Arc<ServerStats>,
}

impl ChatServer {
    /// Bind the listening socket and assemble the server.
    ///
    /// Binding happens here rather than in [`run`](Self::run) so callers can
    /// bind port 0 and read the assigned address back via
    /// [`local_addr`](Self::local_addr).
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;

        let queue = Arc::new(HandoffQueue::new(config.queue_capacity));
        let registry = Arc::new(ClientRegistry::with_config(config.registry.clone()));
        let stats = ServerStats::shared();

        Ok(Self {
            config,
            listener,
            queue,
            registry,
            stats,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Client registry shared with the workers
    pub fn registry(&self) -> &Arc<TcpClientRegistry> {
        &self.registry
    }

    /// Activity counters shared with the workers
    pub fn stats(&self) -> &Arc<ServerStats> {
        &self.stats
    }

    /// Run the server.
    ///
    /// Spawns the worker pool, then accepts connections until the process is
    /// terminated. There is no graceful shutdown; individual accept errors
    /// are logged and the loop continues.
    pub async fn run(self) -> Result<()> {
        let pool = WorkerPool::spawn(
            self.config.worker_count,
            Arc::clone(&self.queue),
            Arc::clone(&self.registry),
            self.config.clone(),
            Arc::clone(&self.stats),
        );

        tracing::info!(
            addr = %self.local_addr()?,
            workers = pool.len(),
            queue_capacity = self.config.queue_capacity,
            "chat relay listening"
        );

        loop {
            match self.listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        tracing::info!(peer = %peer_addr, "new connection");
        self.stats.record_accepted();

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::debug!(peer = %peer_addr, error = %e, "failed to set TCP_NODELAY");
            }
        }

        // A full queue rejects the connection outright; dropping the socket
        // closes it with no protocol-level notice to the client.
        if let Err(rejected) = self.queue.enqueue((socket, peer_addr)) {
            self.stats.record_rejected();
            tracing::warn!(peer = %peer_addr, "handoff queue full, dropping connection");
            drop(rejected);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::time::timeout;

    use crate::registry::{BroadcastScope, RegistryConfig};

    use super::*;

    async fn start_server(
        config: ServerConfig,
    ) -> (SocketAddr, Arc<TcpClientRegistry>, Arc<ServerStats>) {
        let config = config.bind("127.0.0.1:0".parse().unwrap());
        let server = ChatServer::bind(config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let registry = Arc::clone(server.registry());
        let stats = Arc::clone(server.stats());

        tokio::spawn(server.run());
        (addr, registry, stats)
    }

    async fn wait_for_clients(registry: &TcpClientRegistry, count: usize) {
        timeout(Duration::from_secs(2), async {
            while registry.len().await != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("clients should register");
    }

    async fn read_exact(stream: &mut TcpStream, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        timeout(Duration::from_secs(2), stream.read_exact(&mut buf))
            .await
            .expect("payload should arrive")
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_relay_to_all_clients() {
        let (addr, registry, stats) = start_server(ServerConfig::default()).await;

        let mut a = TcpStream::connect(addr).await.unwrap();
        let mut b = TcpStream::connect(addr).await.unwrap();
        let mut c = TcpStream::connect(addr).await.unwrap();
        wait_for_clients(&registry, 3).await;

        a.write_all(b"hello\n").await.unwrap();

        // Default scope delivers to everyone, the sender included.
        assert_eq!(read_exact(&mut b, 6).await, b"hello\n");
        assert_eq!(read_exact(&mut c, 6).await, b"hello\n");
        assert_eq!(read_exact(&mut a, 6).await, b"hello\n");

        assert_eq!(stats.snapshot().connections_accepted, 3);
    }

    #[tokio::test]
    async fn test_relay_excludes_sender_when_configured() {
        let config = ServerConfig::default().registry(
            RegistryConfig::default().broadcast_scope(BroadcastScope::ExcludeSender),
        );
        let (addr, registry, _stats) = start_server(config).await;

        let mut a = TcpStream::connect(addr).await.unwrap();
        let mut b = TcpStream::connect(addr).await.unwrap();
        wait_for_clients(&registry, 2).await;

        a.write_all(b"hello\n").await.unwrap();
        assert_eq!(read_exact(&mut b, 6).await, b"hello\n");

        // The sender must not see its own message.
        let mut buf = [0u8; 1];
        let echo = timeout(Duration::from_millis(200), a.read_exact(&mut buf)).await;
        assert!(echo.is_err(), "sender received its own broadcast");
    }

    #[tokio::test]
    async fn test_relay_appends_configured_terminator() {
        let config = ServerConfig::default().message_terminator(Some(0));
        let (addr, registry, _stats) = start_server(config).await;

        let mut a = TcpStream::connect(addr).await.unwrap();
        let mut b = TcpStream::connect(addr).await.unwrap();
        wait_for_clients(&registry, 2).await;

        a.write_all(b"hi\n").await.unwrap();
        assert_eq!(read_exact(&mut b, 4).await, b"hi\n\0");
    }

    #[tokio::test]
    async fn test_disconnect_unregisters_client() {
        let (addr, registry, _stats) = start_server(ServerConfig::default()).await;

        let _a = TcpStream::connect(addr).await.unwrap();
        let b = TcpStream::connect(addr).await.unwrap();
        wait_for_clients(&registry, 2).await;

        drop(b);
        wait_for_clients(&registry, 1).await;
    }

    #[tokio::test]
    async fn test_two_servers_are_independent() {
        let (addr_one, registry_one, _stats) = start_server(ServerConfig::default()).await;
        let (addr_two, registry_two, _stats) = start_server(ServerConfig::default()).await;

        let mut a = TcpStream::connect(addr_one).await.unwrap();
        let _b = TcpStream::connect(addr_one).await.unwrap();
        let mut other = TcpStream::connect(addr_two).await.unwrap();
        wait_for_clients(&registry_one, 2).await;
        wait_for_clients(&registry_two, 1).await;

        a.write_all(b"one\n").await.unwrap();

        // The second server's client never sees traffic from the first.
        let mut buf = [0u8; 1];
        let crossed = timeout(Duration::from_millis(200), other.read_exact(&mut buf)).await;
        assert!(crossed.is_err(), "broadcast crossed server instances");
    }
}
