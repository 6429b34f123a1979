//! Password hashing via bcrypt.

use super::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Lowest cost bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// bcrypt only reads this many bytes of a password.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Plaintext behind [`PasswordHasher::decoy_digest`].
const DECOY_PASSWORD: &str = "fintrack-decoy-password";

/// Salted one-way password hashing.
///
/// bcrypt embeds a fresh random salt in every digest, so two hashes of the
/// same plaintext differ while both still verify.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl PasswordHasher {
    /// Create a hasher with an explicit cost, rejecting values bcrypt refuses.
    pub fn with_cost(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(AuthError::Validation(format!(
                "bcrypt cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}"
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with bcrypt. Passwords over [`MAX_PASSWORD_BYTES`]
    /// are refused rather than silently truncated.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::Validation(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }
        bcrypt::non_truncating_hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
    }

    /// Verify a password against a bcrypt hash. Malformed hashes and
    /// over-long passwords never match.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::non_truncating_verify(password, hash).unwrap_or(false)
    }

    /// A digest of a fixed throwaway password at this hasher's cost.
    ///
    /// Verifying against it costs the same as verifying a real account, so
    /// callers can spend that time when no account matched.
    pub fn decoy_digest(&self) -> Result<String, AuthError> {
        self.hash(DECOY_PASSWORD)
    }
}
