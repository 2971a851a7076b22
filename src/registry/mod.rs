//! Client registry for broadcast fan-out
//!
//! The registry owns the write half of every active connection and fans a
//! payload out to all of them under a single lock.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<ClientRegistry<W>>
//!                  ┌────────────────────────────┐
//!                  │ clients: BTreeMap<         │
//!                  │   ClientId,                │
//!                  │   ClientEntry { writer }   │
//!                  │ >  (one tokio::Mutex)      │
//!                  └──────────────┬─────────────┘
//!                                 │
//!          register / unregister  │  broadcast(origin, payload)
//!                                 │
//!        [worker 0] ─────────────►│◄───────────── [worker K-1]
//! ```
//!
//! The lock is held for the entire duration of a broadcast, including the
//! socket writes. That gives every recipient whole, non-interleaved messages
//! in one global order, at the cost that a single stalled recipient blocks
//! every concurrent broadcast and registration until its write completes.
//! There is no per-recipient timeout.

pub mod config;
pub mod entry;
pub mod error;
pub mod store;

pub use config::{BroadcastScope, FailurePolicy, RegistryConfig};
pub use entry::{ClientEntry, ClientId};
pub use error::RegistryError;
pub use store::ClientRegistry;
