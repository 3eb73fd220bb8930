//! Configuration schema definitions.
//!
//! Built once at startup by [`ConfigResolver`](crate::config::ConfigResolver)
//! and read by every request handler.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ORIGIN_URL_BASE: &str = "http://localhost:8080/";
pub const DEFAULT_START_PORT: u16 = 3001;
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Root configuration for an image server variant.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Base URL the proxied filenames are appended to.
    pub origin_url_base: String,

    /// Port that variant offsets are added to.
    pub start_port: u16,

    /// Runtime worker threads (0 = platform default).
    pub worker_threads: usize,

    /// Directory holding `20k.jpg`, `50k.jpg` and `100k.jpg`.
    pub images_path: PathBuf,

    /// Env file the settings were read from, if any.
    pub env_file: Option<PathBuf>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            origin_url_base: DEFAULT_ORIGIN_URL_BASE.to_string(),
            start_port: DEFAULT_START_PORT,
            worker_threads: DEFAULT_WORKER_THREADS,
            images_path: PathBuf::from("images"),
            env_file: None,
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// Timeout configuration for upstream fetches and client connections.
#[derive(Debug, Clone, Serialize)]
pub struct TimeoutConfig {
    /// Total budget for an origin fetch, body included, in seconds.
    pub upstream_secs: u64,

    /// Time allowed to receive request headers, in seconds.
    pub read_secs: u64,

    /// Time a single write may stall before the connection is dropped, in seconds.
    pub write_secs: u64,

    /// Idle keep-alive connection timeout in seconds.
    pub idle_secs: u64,
}

impl TimeoutConfig {
    pub fn upstream(&self) -> Duration {
        Duration::from_secs(self.upstream_secs)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_secs: 30,
            read_secs: 10,
            write_secs: 10,
            idle_secs: 120,
        }
    }
}
