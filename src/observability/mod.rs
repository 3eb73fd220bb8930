//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config resolution, listener, handlers, connections
//!     → tracing events (structured fields)
//!     → logging.rs (EnvFilter + fmt layer on stdout)
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings
//! - Request ID flows from the middleware into per-request spans
//! - Per-request spans come from tower-http's TraceLayer

pub mod logging;
