//! Registry error types

use super::entry::ClientId;

/// Error type for registry operations
#[derive(Debug)]
pub enum RegistryError {
    /// The registry's configured client limit is reached
    AtCapacity {
        /// The configured limit
        limit: usize,
    },
    /// A write to one recipient failed during a broadcast
    ///
    /// Under [`FailurePolicy::Abort`](super::FailurePolicy::Abort) this ends
    /// the broadcast; recipients after `recipient` in registration order
    /// received nothing.
    BroadcastWrite {
        /// The recipient whose write failed
        recipient: ClientId,
        /// The underlying I/O error
        source: std::io::Error,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::AtCapacity { limit } => {
                write!(f, "registry at capacity ({} clients)", limit)
            }
            RegistryError::BroadcastWrite { recipient, source } => {
                write!(f, "broadcast write to client {} failed: {}", recipient, source)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::AtCapacity { .. } => None,
            RegistryError::BroadcastWrite { source, .. } => Some(source),
        }
    }
}
