//! Authentication middleware: Bearer token extraction.

use axum::http::header::AUTHORIZATION;
use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::AppError;

/// Raw bearer token taken from the `Authorization` header.
///
/// Stored in request extensions; verification is left to the handler's
/// service call so that every failure maps to the same error.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Axum middleware: extracts `Authorization: Bearer <token>` and injects
/// [`BearerToken`] into request extensions. Missing or non-Bearer headers are
/// rejected with 401.
pub async fn require_bearer(mut request: Request, next: Next) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?
        .to_string();

    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}
