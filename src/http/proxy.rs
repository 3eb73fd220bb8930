//! Origin image proxying.
//!
//! # Responsibilities
//! - Build the origin URL for an identity
//! - Issue one bounded GET (no retries)
//! - Classify the result before any response byte is written
//! - Forward Content-Type/Content-Length and stream the body through
//!
//! # Design Decisions
//! - Two phases: `fetch` decides the status, `into_response` only copies bytes
//! - A body error after the status line is logged and truncates the response
//! - Content-Length is forwarded verbatim and never checked against the body
//! - Dropping the upstream response on any path releases its connection

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;
use hyper::ext::ReasonPhrase;
use reqwest::Client;

use crate::config::ServerConfig;
use crate::http::response::ImageError;
use crate::routing::ImageIdentity;

/// Result of the outbound fetch, one per proxy request.
#[derive(Debug)]
pub enum ProxyOutcome {
    /// Origin answered 200; the body has not been read yet.
    Success {
        content_type: Option<HeaderValue>,
        content_length: Option<HeaderValue>,
        upstream: reqwest::Response,
    },
    /// No status line: connect, DNS, TLS or timeout failure.
    UpstreamError(reqwest::Error),
    /// Origin answered with a status other than 200.
    ///
    /// `reason` holds the origin's reason phrase when it was non-canonical.
    UpstreamStatusError {
        status: StatusCode,
        reason: Option<String>,
    },
}

/// HTTP client used for every origin fetch.
///
/// The timeout covers the whole exchange, body included. System proxy
/// settings are ignored so the origin is always fetched directly.
pub fn origin_client(config: &ServerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeouts.upstream())
        .no_proxy()
        .build()
}

/// `origin_url_base` followed by the identity's filename.
pub fn origin_url(origin_url_base: &str, identity: ImageIdentity) -> String {
    format!("{}{}", origin_url_base, identity.filename())
}

/// Phase one: perform the GET and classify it.
pub async fn fetch(client: &Client, url: &str) -> ProxyOutcome {
    match client.get(url).send().await {
        Ok(upstream) => ProxyOutcome::classify(upstream),
        Err(e) => ProxyOutcome::UpstreamError(e),
    }
}

impl ProxyOutcome {
    pub fn classify(upstream: reqwest::Response) -> Self {
        let status = upstream.status();
        if status != StatusCode::OK {
            let reason = upstream
                .extensions()
                .get::<ReasonPhrase>()
                .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned());
            return ProxyOutcome::UpstreamStatusError { status, reason };
        }

        let headers = upstream.headers();
        ProxyOutcome::Success {
            content_type: headers.get(header::CONTENT_TYPE).cloned(),
            content_length: headers.get(header::CONTENT_LENGTH).cloned(),
            upstream,
        }
    }

    /// Phase two: commit the status and stream whatever the origin sends.
    pub fn into_response(self, url: &str) -> Response {
        match self {
            ProxyOutcome::UpstreamError(e) => {
                tracing::error!(url, error = %e, timeout = e.is_timeout(), "Proxy error");
                ImageError::BadGateway(e).into_response()
            }
            ProxyOutcome::UpstreamStatusError { status, reason } => {
                tracing::warn!(url, status = status.as_u16(), reason = ?reason, "Upstream returned non-200");
                ImageError::upstream_status(status, reason.as_deref()).into_response()
            }
            ProxyOutcome::Success {
                content_type,
                content_length,
                upstream,
            } => {
                let url = url.to_string();
                let stream = upstream.bytes_stream().inspect_err(move |e| {
                    tracing::warn!(url = %url, error = %e, "Error streaming response");
                });

                let mut response = Response::new(Body::from_stream(stream));
                let headers = response.headers_mut();
                if let Some(value) = content_type {
                    headers.insert(header::CONTENT_TYPE, value);
                }
                if let Some(value) = content_length {
                    headers.insert(header::CONTENT_LENGTH, value);
                }
                response
            }
        }
    }
}

/// Proxy `identity` from the origin.
pub async fn serve_proxy(client: &Client, origin_url_base: &str, identity: ImageIdentity) -> Response {
    let url = origin_url(origin_url_base, identity);
    fetch(client, &url).await.into_response(&url)
}
