//! Authentication service — register/login/profile flows over `fintrack_core::auth`.

use fintrack_core::auth::jwt::TokenService;
use fintrack_core::auth::password::{MAX_PASSWORD_BYTES, PasswordHasher};
use fintrack_core::auth::store::CredentialStore;
use fintrack_core::models::auth::{Credential, CredentialUpdate, User};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// Shortest password accepted at registration and password change.
pub const MIN_PASSWORD_LEN: usize = 8;

/// An identity together with a freshly issued session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Input normalisation
// ---------------------------------------------------------------------------

/// Trimmed value, or `None` when absent or blank.
fn supplied(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The form emails are stored and looked up in.
pub fn normalize_lookup_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Lowercased, trimmed email; rejects anything without a `local@domain` shape.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = normalize_lookup_email(email);
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation("Email address is malformed.".into()));
    }
    Ok(email)
}

fn check_password_strength(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes."
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public auth operations
// ---------------------------------------------------------------------------

/// Register a new account and log it in.
pub async fn register(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
    tokens: &TokenService,
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> AppResult<Session> {
    let (Some(username), Some(email), Some(password)) = (
        supplied(username),
        supplied(email),
        password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Username, email and password are required.".into(),
        ));
    };
    let email = normalize_email(email)?;
    check_password_strength(password)?;

    // Early exit only; the store's unique index settles races.
    if store.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered.".into()));
    }

    let pw_hash = hasher.hash(password)?;
    let credential = store.create(username, &email, &pw_hash).await?;
    let token = tokens.issue(credential.id())?;

    info!(user_id = %credential.id(), "user registered");
    Ok(Session {
        user: credential.user,
        token,
    })
}

/// Authenticate with email + password.
///
/// Unknown email and wrong password produce the same error, and both pay for
/// one bcrypt verification: unknown emails are checked against
/// `decoy_digest` (see [`PasswordHasher::decoy_digest`]).
pub async fn login(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
    tokens: &TokenService,
    decoy_digest: &str,
    email: Option<&str>,
    password: Option<&str>,
) -> AppResult<Session> {
    let (Some(email), Some(password)) = (supplied(email), password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::Validation(
            "Email and password are required.".into(),
        ));
    };

    let email = normalize_lookup_email(email);
    let Some(credential) = store.find_by_email(&email).await? else {
        hasher.verify(password, decoy_digest);
        debug!("login rejected: unknown account");
        return Err(AppError::InvalidCredentials);
    };

    if !hasher.verify(password, &credential.password_hash) {
        debug!(user_id = %credential.id(), "login rejected: password mismatch");
        return Err(AppError::InvalidCredentials);
    }

    let token = tokens.issue(credential.id())?;
    info!(user_id = %credential.id(), "user logged in");
    Ok(Session {
        user: credential.user,
        token,
    })
}

/// Update username and/or email of the resolved identity.
pub async fn update_profile(
    store: &dyn CredentialStore,
    identity: &Credential,
    username: Option<&str>,
    email: Option<&str>,
) -> AppResult<User> {
    let username = supplied(username).map(str::to_string);
    let email = supplied(email).map(normalize_email).transpose()?;
    if username.is_none() && email.is_none() {
        return Err(AppError::Validation("No update fields provided.".into()));
    }

    let updated = store
        .update_fields(
            identity.id(),
            CredentialUpdate {
                username,
                email,
                password_hash: None,
            },
        )
        .await?;

    info!(user_id = %updated.id(), "profile updated");
    Ok(updated.user)
}

/// Replace the password after re-verifying the current one.
pub async fn change_password(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
    identity: &Credential,
    current_password: Option<&str>,
    new_password: Option<&str>,
) -> AppResult<()> {
    let (Some(current), Some(new)) = (
        current_password.filter(|p| !p.is_empty()),
        new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Current and new password are required.".into(),
        ));
    };

    if !hasher.verify(current, &identity.password_hash) {
        debug!(user_id = %identity.id(), "password change rejected: current password mismatch");
        return Err(AppError::InvalidCredentials);
    }
    check_password_strength(new)?;

    let pw_hash = hasher.hash(new)?;
    store
        .update_fields(
            identity.id(),
            CredentialUpdate {
                password_hash: Some(pw_hash),
                ..Default::default()
            },
        )
        .await?;

    info!(user_id = %identity.id(), "password changed");
    Ok(())
}
