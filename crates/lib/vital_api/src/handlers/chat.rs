//! Chat relay handler.
//!
//! `POST /api/chat` forwards one message (plus optional history) to the
//! provider and returns its text. Every other method gets a 405.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use vital_core::RelayError;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::ChatResponse;

pub const UNREADABLE_BODY_MESSAGE: &str =
    "Request body could not be read. Please send a shorter message.";

/// `POST /api/chat` — relay a chat message to the provider.
///
/// The body is read as raw bytes so malformed JSON, and bodies the extractor
/// refuses (e.g. over the size limit), are reported with the same
/// `{ "error": ... }` shape as every other failure.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<ChatResponse>> {
    let body = body.map_err(|rejection| {
        tracing::warn!(
            rejection_status = rejection.status().as_u16(),
            "rejected chat body: {}",
            rejection.body_text()
        );
        RelayError::InvalidRequest(UNREADABLE_BODY_MESSAGE.to_string())
    })?;

    let text = state.relay.relay_json(&body).await?;
    Ok(Json(ChatResponse {
        text,
        success: true,
    }))
}

/// Any non-POST method on `/api/chat`.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
