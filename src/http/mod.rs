//! HTTP server module
//!
//! - Axum router with the REST and streaming endpoints
//! - Song listing, lookup and refresh handlers
//! - Byte-range audio streaming
//! - Request-ID and access logging middleware
//! - CORS

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod songs;
pub mod stream;

pub use routes::create_router;
