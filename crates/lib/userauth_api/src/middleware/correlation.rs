//! Per-request correlation ids.

use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, info_span};
use uuid::Uuid;

/// Response header carrying the request's correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Axum middleware: assigns a fresh UUID to each request, runs the rest of
/// the stack inside a span tagged with it, and echoes it in
/// `X-Correlation-Id`.
pub async fn correlation_id(request: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();

    let span = info_span!(
        "request",
        correlation_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}
