//! Password hashing via bcrypt.

use tracing::debug;

use super::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Lowest cost bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Salted one-way password hasher.
///
/// Output is a self-describing bcrypt string (`$2b$<cost>$<salt><hash>`), so
/// verification needs nothing but the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (4..=31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
    }

    /// Verify a password against a bcrypt hash.
    ///
    /// A malformed hash counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                debug!("bcrypt verify rejected stored hash: {e}");
                false
            }
        }
    }

    /// [`PasswordHasher::hash`] on the blocking thread pool.
    pub async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let hasher = *self;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hash task: {e}")))?
    }

    /// [`PasswordHasher::verify`] on the blocking thread pool.
    pub async fn verify_blocking(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = *self;
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task: {e}")))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}
