//! Local image delivery.
//!
//! # Responsibilities
//! - Map an identity to a file under the images directory
//! - Answer 404 when the file is missing
//! - Stream the file with fixed headers, caching disabled
//!
//! # Design Decisions
//! - No range support, no retries
//! - A read error mid-body aborts the connection; the status is already sent

use std::io;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::http::response::ImageError;
use crate::routing::ImageIdentity;

/// Serve `identity` from `images_path`.
pub async fn serve_local(images_path: &Path, identity: ImageIdentity) -> Result<Response, ImageError> {
    let path = images_path.join(identity.filename());

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(ImageError::NotFound),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ImageError::NotFound),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to stat local image");
            return Err(ImageError::Open(e));
        }
    };

    let file = File::open(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Failed to open local image");
        ImageError::Open(e)
    })?;

    let stream = ReaderStream::new(file).inspect_err(move |e| {
        tracing::warn!(path = %path.display(), error = %e, "Local image read failed mid-stream");
    });

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (header::CONTENT_LENGTH, HeaderValue::from(metadata.len())),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
