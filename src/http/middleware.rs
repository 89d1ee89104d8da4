//! HTTP middleware

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest client-supplied request ID that is reused as-is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Tag each request with an ID and log its start and outcome.
///
/// A client-supplied `X-Request-ID` is kept; otherwise a fresh 32-character
/// hex ID is generated. Either way it is echoed on the response. Handlers
/// run inside a `request` span carrying the ID, so everything they log
/// can be tied back to the request.
pub async fn request_id(request: Request<Body>, next: Next) -> Response {
    let id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let span = info_span!("request", request_id = %id);

    let start = Instant::now();
    span.in_scope(|| {
        info!(
            client_ip = %client_ip(&request),
            user_agent = %user_agent(&request),
            "{} {} started",
            method,
            path
        )
    });

    let mut response = next.run(request).instrument(span.clone()).await;

    let duration = start.elapsed();
    let status = response.status();
    span.in_scope(|| {
        if status.is_server_error() {
            error!("{} {} {} in {:?}", method, path, status, duration);
        } else if status.is_client_error() {
            warn!("{} {} {} in {:?}", method, path, status, duration);
        } else {
            info!("{} {} {} in {:?}", method, path, status, duration);
        }
    });

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

/// Client address: the first `X-Forwarded-For` hop, then `X-Real-IP`, then
/// the peer address. `-` when none is known.
fn client_ip(request: &Request<Body>) -> String {
    let headers = request.headers();
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_owned)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "-".to_string())
}

fn user_agent(request: &Request<Body>) -> String {
    request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}
