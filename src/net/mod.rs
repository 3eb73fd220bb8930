//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServerConfig.start_port + variant offset
//!     → port.rs (bind address)
//!     → listener.rs (bind, accept loop)
//!     → connection.rs (timed IO, lifecycle tracking)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - No admission control: every accepted connection is served immediately
//! - Each connection tracked for graceful shutdown
//! - Read/write/idle limits live at the IO layer, below hyper

pub mod connection;
pub mod listener;
pub mod port;

pub use connection::{ConnectionTracker, TimedIo};
pub use listener::{Listener, ListenerError};
