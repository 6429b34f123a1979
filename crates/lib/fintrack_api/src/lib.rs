//! # fintrack_api
//!
//! HTTP API library for Fintrack: the authentication endpoints and the
//! identity gate every protected route sits behind.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use fintrack_core::auth::jwt::TokenService;
use fintrack_core::auth::password::PasswordHasher;
use fintrack_core::auth::store::CredentialStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ApiConfig, ConfigError};
use crate::handlers::{auth, health};

/// Route paths.
pub mod routes {
    pub const GET_HEALTH: &str = "/health";
    pub const POST_AUTH_REGISTER: &str = "/auth/register";
    pub const POST_AUTH_LOGIN: &str = "/auth/login";
    pub const POST_AUTH_LOGOUT: &str = "/auth/logout";
    pub const GET_AUTH_ME: &str = "/auth/me";
    pub const PUT_AUTH_UPDATE: &str = "/auth/update";
    pub const PUT_AUTH_CHANGE_PASSWORD: &str = "/auth/change-password";
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Credential store (PostgreSQL in production).
    pub store: Arc<dyn CredentialStore>,
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Session token issuer/verifier.
    pub tokens: Arc<TokenService>,
    /// bcrypt hasher at the configured cost.
    pub hasher: PasswordHasher,
    /// Digest verified against when a login names no known account.
    pub decoy_digest: Arc<str>,
}

impl AppState {
    /// Validate `config` and derive the token service and hasher from it.
    pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        let tokens = config.token_service()?;
        let hasher = config.password_hasher()?;
        let decoy_digest = hasher
            .decoy_digest()
            .map_err(|e| ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: e.to_string(),
            })?;
        Ok(Self {
            store,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            hasher,
            decoy_digest: decoy_digest.into(),
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_ME, get(auth::me_handler))
        .route(routes::PUT_AUTH_UPDATE, put(auth::update_profile_handler))
        .route(
            routes::PUT_AUTH_CHANGE_PASSWORD,
            put(auth::change_password_handler),
        )
        .route(routes::POST_AUTH_LOGOUT, post(auth::logout_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
