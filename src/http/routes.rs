//! Axum router configuration

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{api_root, health_check};
use super::middleware::{request_id, REQUEST_ID_HEADER};
use super::songs::{get_song, list_songs, refresh_songs};
use super::stream::stream_song;

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(api_root))
        .route("/health", get(health_check))
        .route("/api/songs", get(list_songs))
        .route("/api/songs/refresh", post(refresh_songs))
        .route("/api/song/{id}", get(get_song))
        .route("/api/stream/{id}", get(stream_song).head(stream_song))
        .layer(TraceLayer::new_for_http());

    if state.config.cors_enabled {
        router = router.layer(cors_layer());
    }

    router
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}

/// Browsers need `Range` allowed and the range headers exposed to drive
/// seeking in an `<audio>` element.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::RANGE,
            header::CONTENT_TYPE,
            header::ORIGIN,
            REQUEST_ID_HEADER.clone(),
        ])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
            REQUEST_ID_HEADER.clone(),
        ])
        .allow_private_network(true)
        .max_age(Duration::from_secs(3600))
}
