//! JWT token generation and verification.
//!
//! Access and refresh tokens are HS256 JWTs signed with two independent
//! secrets. A token verifies only against the key of the class it was issued
//! as, and its `token_use` claim must name that class as well.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use crate::config::AuthConfig;
use crate::models::auth::{TokenClaims, TokenKind};

/// Signing material and lifetime for one token class.
struct ClassKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl ClassKey {
    fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

/// Issues and verifies access and refresh tokens.
///
/// Stateless: validity is decided by signature, class and expiry alone.
pub struct TokenService {
    access: ClassKey,
    refresh: ClassKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        // Expiry is checked by hand in `verify_at` so that `now == exp` is
        // rejected and no leeway applies.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            access: ClassKey::new(access_secret, access_ttl),
            refresh: ClassKey::new(refresh_secret, refresh_ttl),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.access_secret.as_bytes(),
            config.refresh_secret.as_bytes(),
            config.access_ttl,
            config.refresh_ttl,
        )
    }

    fn key(&self, kind: TokenKind) -> &ClassKey {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Sign a token of the given class for `subject`, expiring `now + ttl`.
    pub fn issue(&self, kind: TokenKind, subject: &str) -> Result<String, AuthError> {
        let key = self.key(kind);
        let now = Utc::now();
        let exp = now
            .checked_add_signed(key.ttl)
            .ok_or_else(|| AuthError::Internal(format!("{kind} token expiry out of range")))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_use: kind,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Generate a signed access token.
    pub fn issue_access_token(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(TokenKind::Access, subject)
    }

    /// Generate a signed refresh token.
    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(TokenKind::Refresh, subject)
    }

    /// Verify a token of the given class, returning its claims.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(kind, token, Utc::now().timestamp())
    }

    /// Verify a JWT access token, returning the claims on success.
    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify(TokenKind::Access, token)
    }

    /// Verify a JWT refresh token, returning the claims on success.
    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify(TokenKind::Refresh, token)
    }

    fn verify_at(&self, kind: TokenKind, token: &str, now: i64) -> Result<TokenClaims, AuthError> {
        let claims = decode::<TokenClaims>(token, &self.key(kind).decoding, &self.validation)
            .map_err(|e| {
                debug!(%kind, "token rejected: {e}");
                AuthError::InvalidOrExpiredToken
            })?
            .claims;

        if claims.token_use != kind {
            debug!(%kind, found = %claims.token_use, "token rejected: wrong class");
            return Err(AuthError::InvalidOrExpiredToken);
        }
        if now >= claims.exp {
            debug!(%kind, exp = claims.exp, now, "token rejected: expired");
            return Err(AuthError::InvalidOrExpiredToken);
        }
        Ok(claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}
