//! Credential store abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{Credential, CredentialUpdate};

/// Durable record of user identities and password hashes.
///
/// Email uniqueness must be enforced by the backing storage itself so that
/// two concurrent `create` calls for the same email leave exactly one record
/// and fail the other with [`AuthError::DuplicateEmail`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new credential. Fails with `DuplicateEmail` if taken.
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Credential, AuthError>;

    /// Fetch a credential (hash included) by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AuthError>;

    /// Fetch a credential (hash included) by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, AuthError>;

    /// Apply the supplied fields. Fails with `NotFound` for an unknown id and
    /// `DuplicateEmail` if the new email belongs to another record.
    async fn update_fields(
        &self,
        id: Uuid,
        update: CredentialUpdate,
    ) -> Result<Credential, AuthError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), AuthError>;
}
