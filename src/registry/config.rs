//! Registry configuration

/// Which registered clients receive a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastScope {
    /// Deliver to every registered client, including the sender
    #[default]
    All,
    /// Deliver to every registered client except the sender
    ExcludeSender,
}

/// What to do when a write to one recipient fails mid-broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the broadcast at the first failed write.
    ///
    /// Recipients later in registration order receive nothing, and the
    /// caller gets an error naming the failing recipient. The failing
    /// recipient stays registered; its own worker discovers the broken
    /// socket and unregisters it.
    #[default]
    Abort,
    /// Attempt every recipient, logging per-recipient failures.
    ///
    /// The broadcast always succeeds from the caller's point of view and
    /// reports how many recipients were actually reached.
    BestEffort,
}

/// Configuration for [`ClientRegistry`](super::ClientRegistry)
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Broadcast delivery scope
    pub broadcast_scope: BroadcastScope,

    /// Mid-broadcast write failure handling
    pub failure_policy: FailurePolicy,

    /// Maximum registered clients (0 = unlimited)
    pub max_clients: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            broadcast_scope: BroadcastScope::All,
            failure_policy: FailurePolicy::Abort,
            max_clients: 0,
        }
    }
}

impl RegistryConfig {
    /// Set the broadcast scope
    pub fn broadcast_scope(mut self, scope: BroadcastScope) -> Self {
        self.broadcast_scope = scope;
        self
    }

    /// Set the failure policy
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the maximum number of registered clients
    pub fn max_clients(mut self, max: usize) -> Self {
        self.max_clients = max;
        self
    }
}
