//! Authentication request handlers.

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum_extra::extract::{CookieJar, WithRejection};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ResolvedIdentity;
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    UpdateProfileRequest, UserResponse, UserUpdatedResponse,
};
use crate::services::auth::{self, Session};
use crate::services::cookies::{clear_session_cookie, session_cookie};

/// Set the session cookie and build the matching body.
fn deliver_session(
    state: &AppState,
    jar: CookieJar,
    session: Session,
    message: &str,
) -> (CookieJar, Json<AuthResponse>) {
    let max_age = state.tokens.lifetime().num_seconds();
    let jar = jar.add(session_cookie(&session.token, max_age, &state.config.cookie));
    let body = AuthResponse {
        message: message.to_string(),
        user: session.user,
        token: session.token,
        expires_in: max_age,
        token_type: "Bearer".to_string(),
    };
    (jar, Json(body))
}

/// `POST /auth/register` — create an account and log it in.
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let session = auth::register(
        state.store.as_ref(),
        &state.hasher,
        &state.tokens,
        body.username.as_deref(),
        body.email.as_deref(),
        body.password.as_deref(),
    )
    .await?;
    let (jar, body) = deliver_session(&state, jar, session, "User registered successfully.");
    Ok((StatusCode::CREATED, jar, body))
}

/// `POST /auth/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let session = auth::login(
        state.store.as_ref(),
        &state.hasher,
        &state.tokens,
        &state.decoy_digest,
        body.email.as_deref(),
        body.password.as_deref(),
    )
    .await?;
    Ok(deliver_session(&state, jar, session, "Login successful."))
}

/// `POST /auth/logout` — drop the session cookie. The token itself stays
/// valid until it expires.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(ResolvedIdentity(identity)): Extension<ResolvedIdentity>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    info!(user_id = %identity.id(), "user logged out");
    let jar = jar.add(clear_session_cookie(&state.config.cookie));
    (jar, Json(MessageResponse::new("Logged out successfully.")))
}

/// `GET /auth/me` — the identity behind the session token.
pub async fn me_handler(
    Extension(ResolvedIdentity(identity)): Extension<ResolvedIdentity>,
) -> Json<UserResponse> {
    Json(UserResponse {
        user: identity.user,
    })
}

/// `PUT /auth/update` — change username and/or email.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(ResolvedIdentity(identity)): Extension<ResolvedIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateProfileRequest>, AppError>,
) -> AppResult<Json<UserUpdatedResponse>> {
    let user = auth::update_profile(
        state.store.as_ref(),
        &identity,
        body.username.as_deref(),
        body.email.as_deref(),
    )
    .await?;
    Ok(Json(UserUpdatedResponse {
        message: "User updated successfully.".to_string(),
        user,
    }))
}

/// `PUT /auth/change-password` — re-verify the current password, store a new one.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(ResolvedIdentity(identity)): Extension<ResolvedIdentity>,
    WithRejection(Json(body), _): WithRejection<Json<ChangePasswordRequest>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    auth::change_password(
        state.store.as_ref(),
        &state.hasher,
        &identity,
        body.current_password.as_deref(),
        body.new_password.as_deref(),
    )
    .await?;
    Ok(Json(MessageResponse::new("Password updated successfully.")))
}
