//! Authentication and session logic.
//!
//! Provides password hashing, access/refresh JWT management, and the
//! [`service::AuthService`] that orchestrates register, login, refresh and
//! profile lookup on top of a [`crate::directory::UserDirectory`].

pub mod jwt;
pub mod password;
pub mod service;

use thiserror::Error;

/// Authentication errors.
///
/// Every variant except [`AuthError::Internal`] is operational: its message is
/// safe to return to a caller verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("User already exists")]
    UserAlreadyExists,

    /// Shared by "no such user" and "wrong password" so the two are
    /// indistinguishable to a caller.
    #[error("Email or password is wrong")]
    EmailOrPasswordIsWrong,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether the error message may be surfaced to a client unchanged.
    pub fn is_operational(&self) -> bool {
        !matches!(self, AuthError::Internal(_))
    }
}
