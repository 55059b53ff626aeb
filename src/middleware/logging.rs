//! Request logging middleware
//!
//! Every request runs inside an `http_request` span carrying its request id.
//! The id is taken from `x-request-id` when the client supplies one and is
//! echoed on the response.

use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Requests slower than this are logged at warn level
const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

pub async fn log_requests(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!("http_request", request_id = %request_id, method = %method, path = %path);

    let start = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    let latency_ms = elapsed.as_millis() as u64;

    span.in_scope(|| {
        if response.status().is_server_error() || elapsed > SLOW_REQUEST_THRESHOLD {
            warn!(status, latency_ms, "Request completed");
        } else {
            info!(status, latency_ms, "Request completed");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
