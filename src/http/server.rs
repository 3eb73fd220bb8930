//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router through the `RouteRegistrar` adapter
//! - Wire up middleware (request ID, tracing)
//! - Accept connections and serve HTTP/1.1 and h2c via hyper
//! - Apply per-connection read/write/idle limits
//! - Drain in-flight connections on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto,
    service::TowerToHyperService,
};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, ServerVariant};
use crate::http::{health, local, proxy, request};
use crate::net::{ConnectionTracker, Listener, TimedIo};
use crate::routing::{register_image_routes, Endpoint, RouteRegistrar};

/// How long shutdown waits for in-flight connections.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub variant: ServerVariant,
    pub client: reqwest::Client,
}

impl RouteRegistrar for Router<AppState> {
    fn register(self, path: &str, endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Local(identity) => self.route(
                path,
                get(move |State(state): State<AppState>| async move {
                    local::serve_local(&state.config.images_path, identity).await
                }),
            ),
            Endpoint::Proxy(identity) => self.route(
                path,
                get(move |State(state): State<AppState>| async move {
                    proxy::serve_proxy(&state.client, &state.config.origin_url_base, identity).await
                }),
            ),
            Endpoint::Health => self.route(path, get(health::health)),
        }
    }
}

/// HTTP server for one benchmark variant.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: Arc<ServerConfig>, variant: ServerVariant) -> Result<Self, reqwest::Error> {
        let state = AppState {
            client: proxy::origin_client(&config)?,
            config: Arc::clone(&config),
            variant,
        };

        Ok(Self {
            router: Self::build_router(state),
            config,
            tracker: ConnectionTracker::new(),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        register_image_routes(Router::<AppState>::new())
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(request::set_request_id())
                    .layer(TraceLayer::new_for_http())
                    .layer(request::propagate_request_id()),
            )
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, then drain connections.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let (drain_tx, drain_rx) = watch::channel(false);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.serve_connection(stream, peer, drain_rx.clone()),
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        drop(listener);
        let _ = drain_tx.send(true);

        let in_flight = self.tracker.active_count();
        if in_flight > 0 {
            tracing::info!(connections = in_flight, "Draining connections");
        }
        if tokio::time::timeout(DRAIN_TIMEOUT, self.tracker.wait_for_drain())
            .await
            .is_err()
        {
            tracing::warn!(
                connections = self.tracker.active_count(),
                "Drain timed out, abandoning connections"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    fn serve_connection(&self, stream: TcpStream, peer: SocketAddr, mut drain: watch::Receiver<bool>) {
        let guard = self.tracker.track();
        let service = TowerToHyperService::new(self.router.clone());
        let timeouts = self.config.timeouts.clone();

        tokio::spawn(async move {
            let io = TokioIo::new(TimedIo::new(stream, timeouts.write(), timeouts.idle()));

            let mut builder = auto::Builder::new(TokioExecutor::new());
            builder
                .http1()
                .timer(TokioTimer::new())
                .header_read_timeout(timeouts.read());

            let conn = builder.serve_connection(io, service);
            tokio::pin!(conn);

            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(e) = result {
                        tracing::debug!(connection_id = %guard.id(), peer = %peer, error = %e, "Connection ended with error");
                    }
                }
                _ = drain.changed() => {
                    conn.as_mut().graceful_shutdown();
                    if let Err(e) = conn.await {
                        tracing::debug!(connection_id = %guard.id(), peer = %peer, error = %e, "Connection ended with error during drain");
                    }
                }
            }

            drop(guard);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn server(images_path: &std::path::Path) -> HttpServer {
        let config = ServerConfig {
            images_path: images_path.to_path_buf(),
            ..ServerConfig::default()
        };
        HttpServer::new(Arc::new(config), ServerVariant::Axum).unwrap()
    }

    async fn get(router: Router, uri: &str) -> axum::response::Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_variant() {
        let dir = tempfile::tempdir().unwrap();
        let response = get(server(&dir.path().join("missing")).router(), "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "server": "axum"}));
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let dir = tempfile::tempdir().unwrap();
        let response = get(server(dir.path()).router(), "/health").await;
        assert!(response.headers().contains_key(request::X_REQUEST_ID));
    }

    #[tokio::test]
    async fn local_route_serves_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("100k.jpg"), b"large").unwrap();

        let response = get(server(dir.path()).router(), "/local/100k").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"large");
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        let dir = tempfile::tempdir().unwrap();
        let router = server(dir.path()).router();

        assert_eq!(get(router.clone(), "/local/75k").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(router, "/").await.status(), StatusCode::NOT_FOUND);
    }
}
