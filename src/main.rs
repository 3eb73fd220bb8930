//! Image benchmark server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ net::Listener ─▶ http::server ─▶ routing table
//!                                                         │
//!                            ┌────────────────────────────┼──────────────┐
//!                            ▼                            ▼              ▼
//!                      /local/{20k,50k,100k}     /proxy/{20k,50k,100k}  /health
//!                        disk → stream             origin GET → stream
//!                                                         │
//!                                                         ▼
//!                                                       Origin
//!
//!     Cross-cutting: config (env, .env, path probing), lifecycle (runtime,
//!     signals, drain), observability (tracing)
//! ```

use clap::Parser;

use image_bench_server::config::{ConfigResolver, ServerVariant};
use image_bench_server::lifecycle::startup;
use image_bench_server::observability::logging;

#[derive(Parser)]
#[command(name = "image-bench-server")]
#[command(about = "Serve and proxy benchmark images for one harness variant", long_about = None)]
struct Cli {
    /// Variant whose name and port offset this process takes.
    #[arg(short, long, value_enum, default_value_t = ServerVariant::Axum)]
    variant: ServerVariant,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init();

    tracing::info!(variant = %cli.variant, "image-bench-server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ConfigResolver::from_process().resolve();

    let result = startup::build_runtime(config.worker_threads)
        .and_then(|runtime| runtime.block_on(startup::serve(config, cli.variant)));

    if let Err(e) = result {
        tracing::error!(error = %e, "Server failed to start");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
