//! Audio streaming endpoint

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Method},
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::error::ApiError;
use crate::state::AppState;

use super::handlers::{find_song, require_valid_id};

/// GET|HEAD /api/stream/{id}
///
/// Honours a single `Range: bytes=a-b` header. The file is read in chunks
/// as the client consumes it; a HEAD request gets the headers only.
pub async fn stream_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    require_valid_id(&id)?;
    let entry = find_song(&state, &id).await?;

    let range = headers
        .get(header::RANGE)
        .map(|v| v.to_str().unwrap_or_default());

    let stream = state
        .engine
        .stream_entry(&entry, range)
        .await
        .map_err(|e| ApiError::from_library(e, state.expose_error_details()))?;

    let body = match stream.body {
        Some(source) if method != Method::HEAD => Body::from_stream(ReaderStream::new(source)),
        _ => Body::empty(),
    };

    let mut response = Response::new(body);
    *response.status_mut() = stream.status;
    *response.headers_mut() = stream.headers;
    Ok(response)
}
