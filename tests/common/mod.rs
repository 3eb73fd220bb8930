//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use image_bench_server::config::{ServerConfig, ServerVariant};
use image_bench_server::net::Listener;
use image_bench_server::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A running server; dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Config pointing at `images_path` and `origin`.
pub fn config(images_path: &Path, origin: Option<SocketAddr>) -> ServerConfig {
    let mut config = ServerConfig {
        images_path: images_path.to_path_buf(),
        ..ServerConfig::default()
    };
    if let Some(origin) = origin {
        config.origin_url_base = format!("http://{}/", origin);
    }
    config
}

/// Start the server on an ephemeral port.
pub async fn spawn_server(config: ServerConfig) -> TestServer {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();

    let server = HttpServer::new(Arc::new(config), ServerVariant::Axum).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(Listener::from(tcp), server_shutdown).await;
    });

    TestServer {
        addr,
        _shutdown: shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Read the request head so the client doesn't see a reset.
async fn drain_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = vec![0u8; 4096];
    let n = socket.read(&mut buf).await.unwrap_or(0);
    String::from_utf8_lossy(&buf[..n]).into_owned()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Start an origin that answers every request with `status`, `content_type` and `body`.
pub async fn start_origin(status: u16, content_type: Option<&'static str>, body: Vec<u8>) -> SocketAddr {
    start_slow_origin(status, content_type, body, Duration::ZERO).await
}

/// Like [`start_origin`] but waits `delay` before answering.
pub async fn start_slow_origin(
    status: u16,
    content_type: Option<&'static str>,
    body: Vec<u8>,
    delay: Duration,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = Arc::new(body);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                drain_request(&mut socket).await;
                tokio::time::sleep(delay).await;

                let mut head = format!("HTTP/1.1 {} {}\r\n", status, reason(status));
                if let Some(ct) = content_type {
                    head.push_str(&format!("Content-Type: {}\r\n", ct));
                }
                head.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                ));

                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start an origin that answers every request with the `raw` response bytes.
pub async fn start_raw_origin(raw: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                drain_request(&mut socket).await;
                let _ = socket.write_all(raw).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start an origin that accepts connections and never answers.
pub async fn start_silent_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                drain_request(&mut socket).await;
                tokio::time::sleep(Duration::from_secs(3600)).await;
                drop(socket);
            });
        }
    });

    addr
}

/// Start an origin that promises `declared` bytes, sends `sent`, then closes.
pub async fn start_truncating_origin(declared: usize, sent: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let sent = Arc::new(sent);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let sent = sent.clone();
            tokio::spawn(async move {
                drain_request(&mut socket).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    declared
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&sent).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Deterministic pseudo-image bytes.
pub fn image_bytes(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}
