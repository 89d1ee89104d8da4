//! Song listing endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tunestream_lib::Entry;

use crate::error::ApiError;
use crate::state::AppState;

use super::handlers::{find_song, require_valid_id, scan_library, with_library};

#[derive(Debug, Serialize)]
pub struct SongList {
    pub total: usize,
    pub songs: Vec<Entry>,
}

#[derive(Debug, Serialize)]
pub struct RefreshSummary {
    pub total: usize,
    pub last_scan: Option<DateTime<Utc>>,
}

/// GET /api/songs
pub async fn list_songs(State(state): State<Arc<AppState>>) -> Result<Json<SongList>, ApiError> {
    let songs = scan_library(&state).await?;
    Ok(Json(SongList {
        total: songs.len(),
        songs,
    }))
}

/// GET /api/song/{id}
pub async fn get_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Entry>, ApiError> {
    require_valid_id(&id)?;
    find_song(&state, &id).await.map(Json)
}

/// POST /api/songs/refresh
pub async fn refresh_songs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshSummary>, ApiError> {
    let summary = with_library(&state, |library, cancel| {
        library.refresh(cancel)?;
        Ok(RefreshSummary {
            total: library.count(),
            last_scan: library.last_scan(),
        })
    })
    .await?;
    tracing::info!("Library refreshed: {} songs", summary.total);
    Ok(Json(summary))
}
