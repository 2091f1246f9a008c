// Request logging middleware
// One line per request: `METHOD path status - Nms`

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info};

/// Log method, path, status and latency of every request
///
/// Server errors are logged at error level, everything else at info.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis();
    if response.status().is_server_error() {
        error!("{} {} {} - {}ms", method, path, status, elapsed_ms);
    } else {
        info!("{} {} {} - {}ms", method, path, status, elapsed_ms);
    }

    response
}
