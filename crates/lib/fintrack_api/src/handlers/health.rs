//! Health endpoint — liveness plus credential store reachability.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /health` — 200 when the credential store answers, 503 otherwise.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_reachable = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("credential store ping failed: {e}");
            false
        }
    };

    let (status, label) = if store_reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: fintrack_core::version().to_string(),
            store_reachable,
        }),
    )
}
