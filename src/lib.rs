//! Concurrent TCP chat relay
//!
//! Every line of bytes read from one client is broadcast verbatim to every
//! other currently connected client. The crate is built around three pieces
//! of concurrency machinery:
//!
//! ```text
//!                  ┌──────────────┐   enqueue    ┌───────────────────┐
//!   TCP accept ──► │ ChatServer   │ ───────────► │ HandoffQueue      │
//!                  │ (acceptor)   │  (reject on  │ (bounded ring)    │
//!                  └──────────────┘   full)      └─────────┬─────────┘
//!                                                          │ dequeue
//!                                     ┌────────────────────┼───────────┐
//!                                     ▼                    ▼           ▼
//!                                [worker 0]           [worker 1]  [worker K-1]
//!                                     │ register / broadcast / unregister
//!                                     ▼
//!                          ┌────────────────────┐
//!                          │ ClientRegistry     │  one lock, held across
//!                          │ id -> write half   │  the whole fan-out
//!                          └────────────────────┘
//! ```
//!
//! The handoff queue never blocks the acceptor: when `capacity - 1` handles
//! are already pending the connection is rejected and dropped on the spot.
//! Workers are a fixed set of long-lived tasks; a failed session never kills
//! its worker.
//!
//! Broadcasts hold the registry lock for the full fan-out, so they are
//! globally totally ordered and a recipient never observes two broadcasts
//! interleaved. The flip side is intentional and documented: one stalled
//! recipient socket stalls every other broadcast and registration until its
//! write completes. There is no per-client timeout or eviction.
//!
//! # Example
//!
//! ```ignore
//! use chat_relay::{ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> chat_relay::Result<()> {
//!     let config = ServerConfig::default().worker_count(4);
//!     let server = ChatServer::bind(config).await?;
//!     server.run().await
//! }
//! ```

pub mod error;
pub mod queue;
pub mod registry;
pub mod server;
pub mod stats;
pub mod worker;

pub use error::{Error, Result};
pub use queue::HandoffQueue;
pub use registry::{
    BroadcastScope, ClientId, ClientRegistry, FailurePolicy, RegistryConfig, RegistryError,
};
pub use server::{ChatServer, ServerConfig};
pub use stats::{ServerStats, StatsSnapshot};
pub use worker::WorkerPool;
