//! Request tracing middleware

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log one line per request with method, path, status and latency. The
/// log level follows the response class so operator filters line up with
/// what actually went wrong.
pub async fn request_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis();

    if status.is_server_error() {
        tracing::error!(%method, path, status = status.as_u16(), latency_ms, "request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, path, status = status.as_u16(), latency_ms, "request rejected");
    } else {
        tracing::info!(%method, path, status = status.as_u16(), latency_ms, "request completed");
    }

    response
}
