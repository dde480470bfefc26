//! Request logging middleware.
//!
//! One line per request with method, path, status and latency. Auth failures
//! show up as 401/403 here; the gate itself only logs the reason at debug.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn, Instrument};

pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == "/health" {
        return next.run(request).await;
    }

    let span = tracing::info_span!("http_request", method = %method, path = %path);
    let start = Instant::now();

    let response = next.run(request).instrument(span).await;

    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if status >= 500 {
        warn!(%method, %path, status, latency_ms, "Request failed (5xx)");
    } else {
        info!(%method, %path, status, latency_ms, "Request completed");
    }

    response
}
