//! Server configuration

use std::net::SocketAddr;

use crate::registry::RegistryConfig;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Number of long-lived worker tasks
    pub worker_count: usize,

    /// Ring capacity of the handoff queue (holds at most `capacity - 1`
    /// pending connections)
    pub queue_capacity: usize,

    /// Per-read buffer size; broadcast chunks are at most this large
    pub read_buffer_size: usize,

    /// Enable TCP_NODELAY on accepted sockets
    pub tcp_nodelay: bool,

    /// Byte appended to every broadcast after the bytes read, if set.
    ///
    /// `Some(0)` reproduces the historical behavior of relaying a trailing
    /// NUL along with each chunk. Off by default.
    pub message_terminator: Option<u8>,

    /// Registry configuration (broadcast scope, failure policy, client limit)
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:7475".parse().unwrap(),
            worker_count: 4,
            queue_capacity: 16,
            read_buffer_size: 1024,
            tcp_nodelay: true,
            message_terminator: None,
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a config with a custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the number of worker tasks
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero; nothing would ever drain the queue.
    pub fn worker_count(mut self, count: usize) -> Self {
        assert!(count > 0, "worker count must be at least 1");
        self.worker_count = count;
        self
    }

    /// Set the handoff queue ring capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the per-read buffer size
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the trailing terminator byte appended to each broadcast
    pub fn message_terminator(mut self, terminator: Option<u8>) -> Self {
        self.message_terminator = terminator;
        self
    }

    /// Set the registry configuration
    pub fn registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }
}
