//! Application error types.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fintrack_core::auth::AuthError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned for every credential mismatch, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Message returned when a presented token cannot be turned into an identity.
pub const INVALID_TOKEN: &str = "Invalid or expired token.";

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::InvalidCredentials => (
                StatusCode::FORBIDDEN,
                "invalid_credentials",
                INVALID_CREDENTIALS,
            ),
            AppError::Unauthenticated(m) => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", m.as_str())
            }
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::DuplicateEmail => AppError::Conflict("Email already registered.".into()),
            // Only reachable when the resolved account vanished mid-request.
            AuthError::NotFound => AppError::Unauthenticated(INVALID_TOKEN.into()),
            AuthError::Validation(msg) => AppError::Validation(msg),
            AuthError::Token(_) => AppError::Unauthenticated(INVALID_TOKEN.into()),
            AuthError::DbError(e) => AppError::Internal(e.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use fintrack_core::auth::TokenError;

    use super::*;

    async fn body_of(resp: Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let resp = AppError::Internal("relation \"users\" does not exist".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(resp).await;
        assert_eq!(body.error, "internal_error");
        assert_eq!(body.message, "Internal server error");
    }

    #[tokio::test]
    async fn status_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::InvalidCredentials, StatusCode::FORBIDDEN),
            (AppError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn auth_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(AuthError::DuplicateEmail),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::Token(TokenError::Expired)),
            AppError::Unauthenticated(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::InvalidCredentials
        ));
        assert!(matches!(
            AppError::from(AuthError::Internal("boom".into())),
            AppError::Internal(_)
        ));
    }
}
