//! Service endpoints and shared handler helpers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tunestream_lib::{CancellationToken, Entry, Library};

use crate::error::ApiError;
use crate::state::AppState;

/// API root: name, version and endpoint list
pub async fn api_root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "tunestream",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /health - health check",
            "GET /api/songs - list all songs",
            "GET /api/song/{id} - song details",
            "POST /api/songs/refresh - rescan the library",
            "GET /api/stream/{id} - stream audio (supports Range)",
        ],
    }))
}

/// Health check endpoint. Degraded when the music directory is unreachable.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let directory = &state.config.music.directory;
    let accessible = tokio::fs::metadata(directory)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let (status, label) = if accessible {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(json!({
            "status": label,
            "music_dir_accessible": accessible,
            "music_directory": directory,
        })),
    )
}

/// Run a library operation on the blocking pool.
///
/// Every library call that takes the index lock goes through here, so
/// runtime workers never wait on a walk. The operation gets a token that is
/// cancelled if the request future is dropped, so a disconnected client
/// stops the walk it started. Logs from the operation stay in the request
/// span.
pub async fn with_library<T, F>(state: &Arc<AppState>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn Library, &CancellationToken) -> tunestream_lib::Result<T> + Send + 'static,
{
    let expose = state.expose_error_details();
    let library = Arc::clone(&state.library);
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let span = tracing::Span::current();

    tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        op(library.as_ref(), &cancel)
    })
    .await
    .map_err(|e| ApiError::internal(format!("library task failed: {}", e), expose))?
    .map_err(|e| ApiError::from_library(e, expose))
}

/// Scan (usually a cache hit) and return the entries
pub async fn scan_library(state: &Arc<AppState>) -> Result<Vec<Entry>, ApiError> {
    with_library(state, |library, cancel| library.scan(cancel)).await
}

/// Scan, then look up one song under the same blocking call
pub async fn find_song(state: &Arc<AppState>, id: &str) -> Result<Entry, ApiError> {
    let id = id.to_owned();
    with_library(state, move |library, cancel| {
        library.scan(cancel)?;
        library.lookup(&id)
    })
    .await
}

/// Reject identifiers that are not 32 lowercase hex characters
pub fn require_valid_id(id: &str) -> Result<(), ApiError> {
    if tunestream_lib::is_valid_id(id) {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid song ID format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::ServerConfig;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::{Duration, Instant};
    use tunestream_lib::LibraryError;

    fn state_in(dir: &std::path::Path) -> Arc<AppState> {
        let mut config = ServerConfig::default();
        config.music.directory = dir.to_path_buf();
        Arc::new(AppState::new(config))
    }

    #[tokio::test]
    async fn test_dropped_request_cancels_library_op() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let call = with_library(&state, move |_library, cancel| {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !cancel.is_cancelled() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(5));
            }
            flag.store(cancel.is_cancelled(), Ordering::SeqCst);
            Err::<(), _>(LibraryError::Cancelled)
        });

        // The client goes away before the operation finishes
        let result = tokio::time::timeout(Duration::from_millis(50), call).await;
        assert!(result.is_err());

        for _ in 0..200 {
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_find_song() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        let state = state_in(dir.path());
        let id = tunestream_lib::content_id(state.library.root().join("a.mp3"));

        let entry = find_song(&state, &id).await.unwrap();
        assert_eq!(entry.file_name, "a.mp3");

        let err = find_song(&state, "0123456789abcdef0123456789abcdef")
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_require_valid_id() {
        assert!(require_valid_id("0123456789abcdef0123456789abcdef").is_ok());
        let err = require_valid_id("../etc/passwd").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "BAD_REQUEST");
    }
}
