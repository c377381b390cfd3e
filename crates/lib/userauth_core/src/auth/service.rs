//! Auth service: register, login, access-token renewal and profile lookup.

use std::sync::Arc;

use tracing::{debug, info};

use super::AuthError;
use super::jwt::TokenService;
use super::password::PasswordHasher;
use crate::config::AuthConfig;
use crate::directory::{InMemoryUserDirectory, UserDirectory};
use crate::models::auth::{TokenPair, UserProfile};

/// Orchestrates the password hasher, token service and user directory.
pub struct AuthService {
    directory: Arc<dyn UserDirectory>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(directory: Arc<dyn UserDirectory>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            directory,
            hasher,
            tokens,
        }
    }

    /// Service over a fresh in-memory directory.
    pub fn in_memory(config: &AuthConfig) -> Self {
        let hasher = PasswordHasher::new(config.bcrypt_cost);
        Self::new(
            Arc::new(InMemoryUserDirectory::new(hasher)),
            hasher,
            TokenService::from_config(config),
        )
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new account.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), AuthError> {
        require_credentials(email, password)?;

        if self.directory.find_by_email(email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }
        // The directory re-checks atomically, closing the gap between the
        // lookup above and the insert.
        self.directory.add(email, password).await?;

        info!(email, "user registered");
        Ok(())
    }

    /// Authenticate with email + password and issue a fresh token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        require_credentials(email, password)?;

        let Some(user) = self.directory.find_by_email(email).await? else {
            debug!(email, "login failed: unknown email");
            return Err(AuthError::EmailOrPasswordIsWrong);
        };

        if !self
            .hasher
            .verify_blocking(password, &user.password_hash)
            .await?
        {
            debug!(email, "login failed: password mismatch");
            return Err(AuthError::EmailOrPasswordIsWrong);
        }

        let pair = TokenPair {
            access_token: self.tokens.issue_access_token(email)?,
            refresh_token: self.tokens.issue_refresh_token(email)?,
        };
        info!(email, "user logged in");
        Ok(pair)
    }

    /// Exchange a refresh token for a new access token for the same subject.
    ///
    /// Trusts the token's subject claim; the directory is not consulted.
    pub fn renew_access_token(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.verify_refresh_token(refresh_token)?;
        self.tokens.issue_access_token(&claims.sub)
    }

    /// Resolve an access token to the public profile of its subject.
    pub async fn profile_by_token(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let claims = self.tokens.verify_access_token(access_token)?;

        match self.directory.find_by_email(&claims.sub).await? {
            Some(user) => Ok(user.profile()),
            None => {
                debug!(email = %claims.sub, "valid token for unknown subject");
                Err(AuthError::InvalidOrExpiredToken)
            }
        }
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::models::auth::UserRecord;

    fn config() -> AuthConfig {
        let mut cfg = AuthConfig::with_secrets("access-test", "refresh-test");
        cfg.bcrypt_cost = 4;
        cfg
    }

    fn service() -> AuthService {
        AuthService::in_memory(&config())
    }

    /// Directory that accepts writes but never finds anything.
    struct ForgetfulDirectory;

    #[async_trait]
    impl UserDirectory for ForgetfulDirectory {
        async fn add(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
            Ok(())
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, AuthError> {
            Ok(None)
        }
    }

    /// Directory whose backing store is down.
    struct BrokenDirectory;

    #[async_trait]
    impl UserDirectory for BrokenDirectory {
        async fn add(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
            Err(AuthError::Internal("store offline".into()))
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, AuthError> {
            Err(AuthError::Internal("store offline".into()))
        }
    }

    #[tokio::test]
    async fn register_twice_fails() {
        let svc = service();
        svc.register("a@x.com", "pw1").await.unwrap();
        assert_eq!(
            svc.register("a@x.com", "pw2").await,
            Err(AuthError::UserAlreadyExists)
        );
    }

    #[tokio::test]
    async fn empty_credentials_are_rejected() {
        let svc = service();
        assert!(matches!(
            svc.register("", "pw").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            svc.login("a@x.com", "").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = service();
        svc.register("a@x.com", "pw1").await.unwrap();

        let unknown = svc.login("nobody@x.com", "pw1").await.unwrap_err();
        let wrong = svc.login("a@x.com", "nope").await.unwrap_err();
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown, AuthError::EmailOrPasswordIsWrong);
    }

    #[tokio::test]
    async fn login_issues_pair_bound_to_email() {
        let svc = service();
        svc.register("a@x.com", "pw1").await.unwrap();
        let pair = svc.login("a@x.com", "pw1").await.unwrap();

        let access = svc.tokens().verify_access_token(&pair.access_token).unwrap();
        let refresh = svc.tokens().verify_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(access.sub, "a@x.com");
        assert_eq!(refresh.sub, "a@x.com");
    }

    #[tokio::test]
    async fn renew_returns_new_access_token_for_same_subject() {
        let svc = service();
        svc.register("a@x.com", "pw1").await.unwrap();
        let pair = svc.login("a@x.com", "pw1").await.unwrap();

        let renewed = svc.renew_access_token(&pair.refresh_token).unwrap();
        assert_ne!(renewed, pair.access_token);
        let claims = svc.tokens().verify_access_token(&renewed).unwrap();
        assert_eq!(claims.sub, "a@x.com");
    }

    #[tokio::test]
    async fn renew_rejects_access_token_and_garbage() {
        let svc = service();
        svc.register("a@x.com", "pw1").await.unwrap();
        let pair = svc.login("a@x.com", "pw1").await.unwrap();

        assert_eq!(
            svc.renew_access_token(&pair.access_token),
            Err(AuthError::InvalidOrExpiredToken)
        );
        assert_eq!(
            svc.renew_access_token("not.a.token"),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[tokio::test]
    async fn renew_rejects_tampered_refresh_token() {
        let svc = service();
        svc.register("a@x.com", "pw1").await.unwrap();
        let pair = svc.login("a@x.com", "pw1").await.unwrap();
        let other = svc.tokens().issue_refresh_token("admin@x.com").unwrap();

        // Victim's header and signature around another subject's claims.
        let mut parts: Vec<&str> = pair.refresh_token.split('.').collect();
        parts[1] = other.split('.').nth(1).unwrap();
        let swapped = parts.join(".");
        assert_eq!(
            svc.renew_access_token(&swapped),
            Err(AuthError::InvalidOrExpiredToken)
        );

        // Flipped signature character.
        let sig_start = pair.refresh_token.rfind('.').unwrap() + 1;
        let first = &pair.refresh_token[sig_start..sig_start + 1];
        let replacement = if first == "A" { "B" } else { "A" };
        let mut flipped = pair.refresh_token.clone();
        flipped.replace_range(sig_start..sig_start + 1, replacement);
        assert_eq!(
            svc.renew_access_token(&flipped),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[tokio::test]
    async fn renew_rejects_expired_refresh_token() {
        let mut cfg = config();
        cfg.refresh_ttl = Duration::zero();
        let svc = AuthService::in_memory(&cfg);
        svc.register("a@x.com", "pw1").await.unwrap();
        let pair = svc.login("a@x.com", "pw1").await.unwrap();

        assert_eq!(
            svc.renew_access_token(&pair.refresh_token),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[tokio::test]
    async fn profile_excludes_hash() {
        let svc = service();
        svc.register("a@x.com", "pw1").await.unwrap();
        let pair = svc.login("a@x.com", "pw1").await.unwrap();

        let profile = svc.profile_by_token(&pair.access_token).await.unwrap();
        assert_eq!(
            profile,
            UserProfile {
                email: "a@x.com".into()
            }
        );
    }

    #[tokio::test]
    async fn profile_rejects_refresh_token() {
        let svc = service();
        svc.register("a@x.com", "pw1").await.unwrap();
        let pair = svc.login("a@x.com", "pw1").await.unwrap();
        assert_eq!(
            svc.profile_by_token(&pair.refresh_token).await,
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[tokio::test]
    async fn profile_for_vanished_identity_is_invalid_token() {
        let cfg = config();
        let svc = AuthService::new(
            Arc::new(ForgetfulDirectory),
            PasswordHasher::new(cfg.bcrypt_cost),
            TokenService::from_config(&cfg),
        );
        let token = svc.tokens().issue_access_token("ghost@x.com").unwrap();
        assert_eq!(
            svc.profile_by_token(&token).await,
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[tokio::test]
    async fn store_failures_propagate_as_internal() {
        let cfg = config();
        let svc = AuthService::new(
            Arc::new(BrokenDirectory),
            PasswordHasher::new(cfg.bcrypt_cost),
            TokenService::from_config(&cfg),
        );
        assert!(matches!(
            svc.register("a@x.com", "pw1").await,
            Err(AuthError::Internal(_))
        ));
        assert!(matches!(
            svc.login("a@x.com", "pw1").await,
            Err(AuthError::Internal(_))
        ));
    }
}
