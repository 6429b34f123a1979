//! Authentication and identity logic.
//!
//! Provides password hashing, session token management, and the credential
//! store that `fintrack_api` builds its endpoints and middleware on.

pub mod jwt;
pub mod memory;
pub mod password;
pub mod queries;
pub mod store;

use thiserror::Error;

/// Session token verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Token invalid")]
    Invalid,
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Credential not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
