//! Bounded handoff queue between the acceptor and the worker pool
//!
//! Accepted connections are parked here until a worker picks them up. The
//! queue is a fixed-capacity ring buffer: the acceptor never waits on it, and
//! a full queue rejects the connection outright instead of applying
//! backpressure to the accept loop.

pub mod handoff;

pub use handoff::{HandoffQueue, Rejected};
