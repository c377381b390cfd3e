//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! models in `userauth_api` (which carry `#[serde(rename)]` for camelCase).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stored identity: email plus bcrypt hash.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub email: String,
    pub password_hash: String,
}

impl UserRecord {
    /// The externally visible projection of this record.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Public user view. Never carries credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
}

/// Token class; each class has its own signing key and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token presented on every authenticated request.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's email (standard JWT `sub` claim).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
    /// Token class this token was issued as.
    pub token_use: TokenKind,
}

/// Access and refresh token issued together at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
