//! Credential store: user records keyed by a unique, normalized email.
//!
//! The store is deliberately behind a trait so the in-memory backend can be
//! swapped for a durable one without touching the handlers.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::now_unix;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error("credential store unavailable")]
    Internal,
}

/// A stored user record.
///
/// Carries the password hash and therefore never implements `Serialize`;
/// call [`User::public`] at the API boundary so no handler can leak the hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_normalized: String,
    pub password_hash: String,
    pub created_at: i64,
}

impl User {
    /// Read-only projection without the password hash.
    #[must_use]
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: i64,
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub trait UserStore: Send + Sync {
    /// Append a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEmail`] when the normalized email is
    /// already taken, [`StoreError::Internal`] when the store is unusable.
    fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Look up the single record matching the normalized email.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] when the store is unusable.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] when the store is unusable.
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Process-wide in-memory backend. Records live until the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let email_normalized = normalize_email(email);

        // Existence check and insert happen under one write guard so two
        // concurrent registrations for the same email cannot both succeed.
        let mut inner = self.inner.write().map_err(|_| StoreError::Internal)?;
        if inner.by_email.contains_key(&email_normalized) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.trim().to_string(),
            email_normalized: email_normalized.clone(),
            password_hash: password_hash.to_string(),
            created_at: now_unix(),
        };

        inner.by_email.insert(email_normalized, user.id);
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email_normalized = normalize_email(email);
        let inner = self.inner.read().map_err(|_| StoreError::Internal)?;
        Ok(inner
            .by_email
            .get(&email_normalized)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Internal)?;
        Ok(inner.users.get(&id).cloned())
    }
}
