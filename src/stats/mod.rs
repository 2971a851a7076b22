//! Server activity counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide activity counters, shared between the acceptor and workers
#[derive(Debug, Default)]
pub struct ServerStats {
    connections_accepted: AtomicU64,
    connections_rejected: AtomicU64,
    broadcasts: AtomicU64,
    broadcast_failures: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Connections accepted from the listener
    pub connections_accepted: u64,
    /// Connections dropped because the handoff queue was full
    pub connections_rejected: u64,
    /// Broadcasts completed
    pub broadcasts: u64,
    /// Broadcasts aborted by a failed write
    pub broadcast_failures: u64,
}

impl ServerStats {
    /// Create a zeroed stats block
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zeroed stats block behind an `Arc`
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Count an accepted connection
    pub fn record_accepted(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a connection rejected by the full handoff queue
    pub fn record_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a completed broadcast
    pub fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed broadcast
    pub fn record_broadcast_failure(&self) {
        self.broadcast_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            broadcast_failures: self.broadcast_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = ServerStats::new();

        stats.record_accepted();
        stats.record_accepted();
        stats.record_rejected();
        stats.record_broadcast();
        stats.record_broadcast_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.connections_accepted, 2);
        assert_eq!(snap.connections_rejected, 1);
        assert_eq!(snap.broadcasts, 1);
        assert_eq!(snap.broadcast_failures, 1);
    }
}
