use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use serde_json::Value;

use image_bench_server::config::{ConfigResolver, ServerVariant};

/// Matches the harness runner's liveness probe budget.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "bench-cli")]
#[command(about = "Operator CLI for the image server benchmark harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every variant and the port it binds
    Ports,
    /// Probe /health on every variant
    Check {
        #[arg(long, default_value = "localhost")]
        host: String,
    },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigResolver::from_process().resolve();

    match cli.command {
        Commands::Ports => {
            for variant in ServerVariant::ALL {
                match variant.port(config.start_port) {
                    Some(port) => println!("{:<8} {:<10} {}", variant, variant.language(), port),
                    None => println!("{:<8} {:<10} out of range", variant, variant.language()),
                }
            }
        }
        Commands::Check { host } => {
            let client = reqwest::Client::builder()
                .timeout(HEALTH_TIMEOUT)
                .no_proxy()
                .build()?;

            let start_port = config.start_port;
            let probes = ServerVariant::ALL.into_iter().map(|variant| {
                let client = client.clone();
                let host = host.clone();
                async move {
                    let status = match variant.port(start_port) {
                        Some(port) => probe(&client, &host, port).await,
                        None => Err("port out of range".to_string()),
                    };
                    (variant, status)
                }
            });

            for (variant, status) in join_all(probes).await {
                match status {
                    Ok(server) => println!("{:<8} up   (reports \"{}\")", variant, server),
                    Err(reason) => println!("{:<8} down ({})", variant, reason),
                }
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// `Ok(server name)` when `/health` answers 200.
async fn probe(client: &reqwest::Client, host: &str, port: u16) -> Result<String, String> {
    let res = client
        .get(format!("http://{}:{}/health", host, port))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
        return Err(format!("status {}", res.status()));
    }

    let json: Value = res.json().await.map_err(|e| e.to_string())?;
    Ok(json
        .get("server")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string())
}
