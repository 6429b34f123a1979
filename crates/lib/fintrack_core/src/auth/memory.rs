//! In-memory credential store, for tests and database-less local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use super::store::CredentialStore;
use crate::models::auth::{Credential, CredentialUpdate, User};
use crate::uuid::uuidv7;

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<Uuid, Credential>,
    /// email → id; the uniqueness index.
    by_email: HashMap<String, Uuid>,
}

/// Credential store held in process memory.
///
/// Every mutation runs under one write lock, so the email check and insert
/// are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a record. Used to simulate an account deleted after login.
    pub async fn remove(&self, id: Uuid) -> Option<Credential> {
        let mut inner = self.inner.write().await;
        let removed = inner.by_id.remove(&id)?;
        inner.by_email.remove(&removed.user.email);
        Some(removed)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Credential, AuthError> {
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(email) {
            debug!("email already taken");
            return Err(AuthError::DuplicateEmail);
        }

        let credential = Credential {
            user: User {
                id: uuidv7(),
                username: username.to_string(),
                email: email.to_string(),
                created_at: Utc::now(),
            },
            password_hash: password_hash.to_string(),
        };
        inner.by_email.insert(email.to_string(), credential.id());
        inner.by_id.insert(credential.id(), credential.clone());
        Ok(credential)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AuthError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AuthError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn update_fields(
        &self,
        id: Uuid,
        update: CredentialUpdate,
    ) -> Result<Credential, AuthError> {
        let mut inner = self.inner.write().await;
        let current_email = inner
            .by_id
            .get(&id)
            .map(|c| c.user.email.clone())
            .ok_or(AuthError::NotFound)?;

        if let Some(email) = &update.email
            && *email != current_email
        {
            if inner.by_email.contains_key(email) {
                debug!(%id, "email already taken");
                return Err(AuthError::DuplicateEmail);
            }
            inner.by_email.remove(&current_email);
            inner.by_email.insert(email.clone(), id);
        }

        let credential = inner.by_id.get_mut(&id).ok_or(AuthError::NotFound)?;
        if let Some(username) = update.username {
            credential.user.username = username;
        }
        if let Some(email) = update.email {
            credential.user.email = email;
        }
        if let Some(hash) = update.password_hash {
            credential.password_hash = hash;
        }
        Ok(credential.clone())
    }

    async fn ping(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
