//! Health endpoint.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /api/health` — reports version, model, and whether a credential is set.
///
/// Never contacts the provider.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: vital_core::version().to_string(),
        model: state.relay.config().model.clone(),
        provider_configured: state.relay.is_configured(),
    })
}
