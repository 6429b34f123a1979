//! Session token issuance and verification (HS256 JWT).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::{AuthError, TokenError};
use crate::models::auth::TokenClaims;

/// Session token lifetime: 24 hours.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Shortest signing secret accepted at startup.
pub const MIN_SECRET_LEN: usize = 32;

/// Issues and statelessly verifies signed session tokens.
///
/// The signing secret is fixed for the lifetime of the service; there is no
/// server-side revocation, so a token stays valid until `exp`.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a token service from the process-wide signing secret.
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Validation(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if lifetime <= Duration::zero() {
            return Err(AuthError::Validation(
                "token lifetime must be positive".into(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject`, valid from now.
    pub fn issue(&self, subject: Uuid) -> Result<String, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token for `subject` as if it were created at `issued_at`.
    pub fn issue_at(&self, subject: Uuid, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify signature then expiry, returning the subject id.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let data =
            decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}
