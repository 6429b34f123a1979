//! Session token extraction and identity resolution.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use fintrack_core::models::auth::Credential;
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, INVALID_TOKEN};
use crate::services::cookies::SESSION_COOKIE;

/// The credential behind the request's session token, stored in request
/// extensions for downstream handlers. Includes the password hash so that
/// change-password can re-verify it.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity(pub Credential);

/// Find the session token on a request.
///
/// Precedence is fixed: the session cookie wins; `Authorization: Bearer`
/// is only consulted when no non-empty cookie is present.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Axum middleware: resolves the session token into a [`ResolvedIdentity`]
/// and rejects the request with 401 before the handler runs otherwise.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| AppError::Unauthenticated("No token provided.".into()))?;

    let user_id = state.tokens.verify(&token).map_err(|e| {
        debug!(reason = %e, "session token rejected");
        AppError::Unauthenticated(INVALID_TOKEN.into())
    })?;

    let credential = state.store.find_by_id(user_id).await?.ok_or_else(|| {
        debug!(%user_id, "session token refers to a missing account");
        AppError::Unauthenticated(INVALID_TOKEN.into())
    })?;

    request
        .extensions_mut()
        .insert(ResolvedIdentity(credential));

    Ok(next.run(request).await)
}
