//! Account service: registration, authentication and credential updates.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::UserId;

use crate::error::{AuthError, Result};
use crate::password::{generate_salt, hash_password, verify_password};

/// Login credentials presented by a client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Creates credentials from username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Trait for authentication implementations.
///
/// The booking core consumes only this: a verified user id per call.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the account's user id.
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId>;
}

/// A partial account update.
///
/// Fields that are `None` are left untouched. The password rule is an
/// explicit three-way decision:
/// 1. no password in the update: hash and salt stay as they are;
/// 2. the unchanged password: hash and salt stay as they are;
/// 3. a new password: fresh salt, rehash.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub display_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
struct AccountRecord {
    id: UserId,
    display_name: Option<String>,
    password_hash: String,
    salt: String,
}

/// In-memory account service.
#[derive(Clone, Default)]
pub struct InMemoryAccounts {
    users: Arc<RwLock<HashMap<String, AccountRecord>>>,
}

impl InMemoryAccounts {
    /// Creates a new empty account service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new account and returns its user id.
    ///
    /// Every account gets its own salt at registration.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId> {
        if username.is_empty() {
            return Err(AuthError::InvalidInput("username is empty".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password is empty".to_string()));
        }

        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let id = UserId::new();
        let salt = generate_salt();
        let password_hash = hash_password(password, &salt);
        users.insert(
            username.to_string(),
            AccountRecord {
                id,
                display_name: None,
                password_hash,
                salt,
            },
        );

        tracing::info!(%id, username, "account registered");
        Ok(id)
    }

    /// Applies a partial update to an account.
    #[tracing::instrument(skip(self, update))]
    pub async fn update(&self, username: &str, update: AccountUpdate) -> Result<()> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(username)
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;

        if let Some(display_name) = update.display_name {
            record.display_name = Some(display_name);
        }

        match update.password {
            // No password in the update: credentials stay untouched.
            None => {}
            // Unchanged password: keep the existing hash and salt.
            Some(ref password)
                if verify_password(password, &record.salt, &record.password_hash) => {}
            // New password: fresh salt, rehash.
            Some(ref password) => {
                if password.is_empty() {
                    return Err(AuthError::InvalidInput("password is empty".to_string()));
                }
                record.salt = generate_salt();
                record.password_hash = hash_password(password, &record.salt);
            }
        }

        Ok(())
    }

    /// Returns an account's display name, if set.
    pub async fn display_name(&self, username: &str) -> Result<Option<String>> {
        let users = self.users.read().await;
        let record = users
            .get(username)
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;
        Ok(record.display_name.clone())
    }
}

#[async_trait]
impl AuthService for InMemoryAccounts {
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId> {
        let users = self.users.read().await;
        let record = users
            .get(&credentials.username)
            .ok_or_else(|| AuthError::UnknownUser(credentials.username.clone()))?;

        if !verify_password(&credentials.password, &record.salt, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(record.id)
    }
}
