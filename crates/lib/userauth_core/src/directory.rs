//! User directory: the authoritative store of registered identities.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::auth::AuthError;
use crate::auth::password::PasswordHasher;
use crate::models::auth::UserRecord;

/// Storage for identity records keyed by email.
///
/// Implementations must make `add` atomic with respect to the key: of two
/// concurrent adds for the same email, exactly one succeeds and the other
/// fails with [`AuthError::UserAlreadyExists`]. Existing records are never
/// overwritten.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Hash `password` and store a new record for `email`.
    async fn add(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Exact, case-sensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;
}

/// In-memory directory backed by a sharded concurrent map.
///
/// Contents live only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<String, UserRecord>,
    hasher: PasswordHasher,
}

impl InMemoryUserDirectory {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            users: DashMap::new(),
            hasher,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn add(&self, email: &str, password: &str) -> Result<(), AuthError> {
        // Hash before taking the shard lock; bcrypt is slow.
        let password_hash = self.hasher.hash_blocking(password).await?;

        match self.users.entry(email.to_string()) {
            Entry::Occupied(_) => {
                debug!(email, "insert rejected: key already present");
                Err(AuthError::UserAlreadyExists)
            }
            Entry::Vacant(slot) => {
                slot.insert(UserRecord {
                    email: email.to_string(),
                    password_hash,
                });
                Ok(())
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.users.get(email).map(|r| r.value().clone()))
    }
}
