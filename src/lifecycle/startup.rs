//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the Tokio runtime, honouring the worker-thread hint
//! - Compute the variant's bind address
//! - Bind the listener and run the server until a signal arrives
//!
//! # Design Decisions
//! - Fail fast: any error here ends the process with a non-zero status
//! - Listener binds last, after the HTTP client and router exist

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::config::{ServerConfig, ServerVariant};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::{port, Listener, ListenerError};

/// Errors that stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// The async runtime could not be built.
    Runtime(std::io::Error),
    /// `start_port + offset` does not fit in a port number.
    PortOverflow { start_port: u16, offset: u16 },
    /// The origin HTTP client could not be built.
    Client(reqwest::Error),
    /// The listener could not bind.
    Listener(ListenerError),
    /// The accept loop failed.
    Serve(std::io::Error),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::Runtime(e) => write!(f, "Failed to build runtime: {}", e),
            StartupError::PortOverflow { start_port, offset } => write!(
                f,
                "Port out of range: start port {} + offset {}",
                start_port, offset
            ),
            StartupError::Client(e) => write!(f, "Failed to build HTTP client: {}", e),
            StartupError::Listener(e) => write!(f, "{}", e),
            StartupError::Serve(e) => write!(f, "Server failed: {}", e),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Runtime(e) | StartupError::Serve(e) => Some(e),
            StartupError::Client(e) => Some(e),
            StartupError::Listener(e) => Some(e),
            StartupError::PortOverflow { .. } => None,
        }
    }
}

/// Multi-threaded runtime; `worker_threads == 0` keeps Tokio's default.
pub fn build_runtime(worker_threads: usize) -> Result<Runtime, StartupError> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all();
    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }
    builder.build().map_err(StartupError::Runtime)
}

/// Serve `variant` until SIGINT/SIGTERM.
pub async fn serve(config: ServerConfig, variant: ServerVariant) -> Result<(), StartupError> {
    let addr = port::bind_address(config.start_port, variant.offset()).ok_or(
        StartupError::PortOverflow {
            start_port: config.start_port,
            offset: variant.offset(),
        },
    )?;

    let server =
        HttpServer::new(Arc::new(config), variant).map_err(StartupError::Client)?;
    let listener = Listener::bind(addr).await.map_err(StartupError::Listener)?;

    tracing::info!(
        variant = %variant,
        address = %addr,
        origin_url_base = %server.config().origin_url_base,
        "Server listening"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
