//! In-memory account store, keyed by email.

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};
use super::password::{hash_password, verify_password};

/// A dashboard account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct AccountStore {
    by_email: DashMap<String, Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account. Fails with `EmailTaken` if the email is in use.
    pub fn register(&self, name: &str, email: &str, password: &str) -> AuthResult<Account> {
        // Hash outside the map lock; argon2 is slow on purpose
        let password_hash = hash_password(password).map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            AuthError::PasswordHash
        })?;

        match self.by_email.entry(email.to_string()) {
            Entry::Occupied(_) => Err(AuthError::EmailTaken),
            Entry::Vacant(slot) => {
                let account = Account {
                    id: Uuid::now_v7().to_string(),
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash,
                    created_at: Utc::now(),
                };
                slot.insert(account.clone());
                Ok(account)
            }
        }
    }

    /// Check credentials and return the account.
    pub fn login(&self, email: &str, password: &str) -> AuthResult<Account> {
        let account = self
            .by_email
            .get(email)
            .map(|entry| entry.value().clone())
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = verify_password(password, &account.password_hash)
            .map_err(|_| AuthError::PasswordHash)?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(account)
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}
