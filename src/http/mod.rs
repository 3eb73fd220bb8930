//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::TimedIo)
//!     → server.rs (hyper auto builder, axum Router, middleware)
//!     → request.rs (x-request-id assigned and echoed)
//!     → local.rs  : /local/*  → disk → streamed body
//!       proxy.rs  : /proxy/*  → origin GET → classify → streamed body
//!       health.rs : /health
//!     → response.rs (structured JSON errors)
//!     → Send to client
//! ```

pub mod health;
pub mod local;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ErrorBody, ImageError};
pub use server::{AppState, HttpServer};
