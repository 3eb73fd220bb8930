//! Image Benchmark Server Library
//!
//! One engine behind every benchmark variant: serve three fixed images from
//! disk under `/local/*` and proxy the same images from an origin under
//! `/proxy/*`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::{ConfigResolver, ServerConfig, ServerVariant};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::ImageIdentity;
