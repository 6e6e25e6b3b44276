//! Identity gate
//!
//! Folio does not manage accounts itself. It only needs "who is signed in",
//! plus sign-in, sign-up and sign-out, which any provider can supply.

use crate::error::IdentityError;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// User id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Ulid);

impl UserId {
    /// Create new user ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: UserId,
    /// Login name
    pub username: String,
}

/// Sign-in or sign-up credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Secret
    pub password: String,
}

impl Credentials {
    /// Create new credentials
    #[inline]
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication collaborator
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Currently signed-in user
    async fn current_user(&self) -> Option<User>;

    /// Sign in an existing user
    ///
    /// # Errors
    /// Returns `IdentityError::InvalidCredentials` for unknown users or a
    /// wrong password
    async fn sign_in(&self, credentials: &Credentials) -> Result<User, IdentityError>;

    /// Register and sign in a new user
    ///
    /// # Errors
    /// - `IdentityError::AlreadyRegistered` if the username is taken
    /// - `IdentityError::InvalidCredentials` for an empty username or password
    async fn sign_up(&self, credentials: &Credentials) -> Result<User, IdentityError>;

    /// End the current session
    async fn sign_out(&self);
}

#[derive(Debug)]
struct Account {
    user: User,
    password: String,
}

/// Process-local identity provider
#[derive(Debug, Default)]
pub struct InMemoryIdentity {
    accounts: DashMap<String, Account>,
    current: RwLock<Option<User>>,
}

impl InMemoryIdentity {
    /// Create provider with no accounts
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create provider with one account already signed in
    #[must_use]
    pub fn signed_in(username: impl Into<String>) -> Self {
        let username = username.into();
        let user = User {
            id: UserId::new(),
            username: username.clone(),
        };
        let identity = Self::new();
        identity.accounts.insert(
            username,
            Account {
                user: user.clone(),
                password: String::new(),
            },
        );
        *identity.current.write() = Some(user);
        identity
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn current_user(&self) -> Option<User> {
        self.current.read().clone()
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<User, IdentityError> {
        let user = match self.accounts.get(&credentials.username) {
            Some(account) if account.password == credentials.password => account.user.clone(),
            _ => return Err(IdentityError::InvalidCredentials),
        };
        tracing::info!("Signed in as {}", user.username);
        *self.current.write() = Some(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<User, IdentityError> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(IdentityError::InvalidCredentials);
        }

        let user = match self.accounts.entry(credentials.username.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(IdentityError::AlreadyRegistered(credentials.username.clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let user = User {
                    id: UserId::new(),
                    username: credentials.username.clone(),
                };
                slot.insert(Account {
                    user: user.clone(),
                    password: credentials.password.clone(),
                });
                user
            }
        };

        tracing::info!("Registered {}", user.username);
        *self.current.write() = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) {
        if let Some(user) = self.current.write().take() {
            tracing::info!("Signed out {}", user.username);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_in_and_out() {
        let identity = InMemoryIdentity::new();
        assert!(identity.current_user().await.is_none());

        let creds = Credentials::new("ada", "engine");
        let user = identity.sign_up(&creds).await.unwrap();
        assert_eq!(identity.current_user().await, Some(user.clone()));

        identity.sign_out().await;
        assert!(identity.current_user().await.is_none());

        let again = identity.sign_in(&creds).await.unwrap();
        assert_eq!(again.id, user.id);
    }

    #[tokio::test]
    async fn rejects_bad_credentials_and_duplicates() {
        let identity = InMemoryIdentity::new();
        identity.sign_up(&Credentials::new("ada", "engine")).await.unwrap();

        assert_eq!(
            identity.sign_in(&Credentials::new("ada", "wrong")).await.unwrap_err(),
            IdentityError::InvalidCredentials
        );
        assert_eq!(
            identity.sign_in(&Credentials::new("bob", "engine")).await.unwrap_err(),
            IdentityError::InvalidCredentials
        );
        assert_eq!(
            identity.sign_up(&Credentials::new("ada", "x")).await.unwrap_err(),
            IdentityError::AlreadyRegistered("ada".to_string())
        );
        assert_eq!(
            identity.sign_up(&Credentials::new(" ", "x")).await.unwrap_err(),
            IdentityError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn signed_in_constructor() {
        let identity = InMemoryIdentity::signed_in("local");
        assert_eq!(identity.current_user().await.unwrap().username, "local");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("ada", "engine"));
        assert!(!debug.contains("engine"));
    }
}
