//! Application error types.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};
use userauth_core::auth::AuthError;

use crate::models::ErrorResponse;

/// Message returned in place of any internal error detail.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::BadRequest(m) | AppError::Unauthorized(m) => {
                warn!(status = status.as_u16(), "{m}");
                m.clone()
            }
            AppError::Internal(detail) => {
                error!(status = status.as_u16(), detail = %detail, "request failed");
                GENERIC_ERROR_MESSAGE.to_string()
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        if !e.is_operational() {
            return AppError::Internal(e.to_string());
        }
        match e {
            AuthError::InvalidOrExpiredToken => AppError::Unauthorized(e.to_string()),
            _ => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}
