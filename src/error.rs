//! Server error types
//!
//! `ServerError` covers startup and configuration failures. `ApiError` is
//! the JSON body returned to clients when a request fails.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tunestream_lib::LibraryError;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error body sent to API clients
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: format!("{} not found", resource),
            details: None,
        }
    }

    /// Internal failure; `detail` is only attached when `expose` is set
    pub fn internal(detail: impl Into<String>, expose: bool) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: "Internal server error".to_string(),
            details: expose.then(|| detail.into()),
        }
    }

    /// Map a library outcome onto the API error taxonomy
    pub fn from_library(err: LibraryError, expose: bool) -> Self {
        match err {
            LibraryError::BadRequest(msg) => Self::bad_request(msg),
            LibraryError::NotFound(_) => Self::not_found("Song"),
            LibraryError::Forbidden(_) => Self {
                status: StatusCode::FORBIDDEN,
                code: "FORBIDDEN",
                message: "Access denied".to_string(),
                details: None,
            },
            LibraryError::RangeNotSatisfiable { size } => Self {
                status: StatusCode::RANGE_NOT_SATISFIABLE,
                code: "RANGE_NOT_SATISFIABLE",
                message: format!("Range not satisfiable for file of {} bytes", size),
                details: None,
            },
            other => {
                tracing::error!("Request failed: {}", other);
                Self::internal(other.to_string(), expose)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
