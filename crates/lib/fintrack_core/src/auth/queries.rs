//! PostgreSQL credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use super::store::CredentialStore;
use crate::models::auth::{Credential, CredentialUpdate, User};
use crate::uuid::uuidv7;

type CredentialRow = (Uuid, String, String, String, DateTime<Utc>);

fn into_credential((id, username, email, password_hash, created_at): CredentialRow) -> Credential {
    Credential {
        user: User {
            id,
            username,
            email,
            created_at,
        },
        password_hash,
    }
}

/// Map a unique-index violation on `users.email` to `DuplicateEmail`.
fn map_unique_violation(e: sqlx::Error) -> AuthError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            debug!(constraint = db.constraint(), "email already taken");
            AuthError::DuplicateEmail
        }
        _ => AuthError::DbError(e),
    }
}

/// Credential store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Credential, AuthError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(uuidv7())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(into_credential(row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AuthError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(into_credential))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AuthError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(into_credential))
    }

    async fn update_fields(
        &self,
        id: Uuid,
        update: CredentialUpdate,
    ) -> Result<Credential, AuthError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "UPDATE users SET \
               username = COALESCE($2, username), \
               email = COALESCE($3, email), \
               password_hash = COALESCE($4, password_hash), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(id)
        .bind(update.username)
        .bind(update.email)
        .bind(update.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        row.map(into_credential).ok_or(AuthError::NotFound)
    }

    async fn ping(&self) -> Result<(), AuthError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
