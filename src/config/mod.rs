//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment ──┐
//!                       ├─→ loader.rs (ConfigResolver: env file probe, typed lookups)
//! first readable .env ──┘       → images directory probe
//!                               → ServerConfig (immutable)
//!                               → shared via Arc to every handler
//! ```
//!
//! # Design Decisions
//! - Resolution never fails: every anomaly is logged and replaced by a default
//! - Env file values sit below the process environment, which is never mutated
//! - Candidate paths are probed in a fixed order, first match wins

pub mod env;
pub mod loader;
pub mod schema;
pub mod variant;

pub use env::{EnvSource, ProcessEnv};
pub use loader::{ConfigResolver, EnvFile};
pub use schema::{ServerConfig, TimeoutConfig};
pub use variant::ServerVariant;
