//! Response shaping for request-level failures.
//!
//! # Design Decisions
//! - Every failure is a JSON body `{"error": "..."}`
//! - Upstream non-200 statuses pass through unchanged
//! - Failures after the status line is sent are not represented here

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failures that are answered with an error status.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Benchmark image missing on disk.
    #[error("Image not found")]
    NotFound,

    /// Image exists but could not be opened.
    #[error("Failed to open image")]
    Open(#[source] std::io::Error),

    /// Origin unreachable, timed out, or failed before a status line.
    #[error("Bad gateway")]
    BadGateway(#[source] reqwest::Error),

    /// Origin answered with something other than 200.
    #[error("Upstream error: {status_line}")]
    UpstreamStatus {
        status: StatusCode,
        status_line: String,
    },
}

impl ImageError {
    /// `reason` is the phrase the origin sent, when it differs from the canonical one.
    pub fn upstream_status(status: StatusCode, reason: Option<&str>) -> Self {
        ImageError::UpstreamStatus {
            status,
            status_line: status_line(status, reason),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ImageError::NotFound => StatusCode::NOT_FOUND,
            ImageError::Open(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ImageError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ImageError::UpstreamStatus { status, .. } => *status,
        }
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// `"404 Not Found"`, preferring `reason` over the canonical phrase, or just
/// the code when neither is known.
pub fn status_line(status: StatusCode, reason: Option<&str>) -> String {
    match reason.or_else(|| status.canonical_reason()) {
        Some(reason) => format!("{} {}", status.as_str(), reason),
        None => status.as_str().to_string(),
    }
}
