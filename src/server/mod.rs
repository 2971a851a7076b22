//! TCP acceptor and server assembly
//!
//! Binds the listening socket, spawns the worker pool, and feeds accepted
//! connections into the handoff queue. A connection the queue rejects is
//! dropped on the spot with no notice to the client.

pub mod config;
pub mod listener;

pub use config::ServerConfig;
pub use listener::ChatServer;
