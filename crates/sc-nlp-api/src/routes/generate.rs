//! Reply generation endpoint.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use sc_protocol::{Context, GenerateResult};

use super::parse::{validate_message, validate_user_id};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for generating a reply.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub user_message: String,
    #[serde(default)]
    pub context: Option<Context>,
    pub user_id: String,
}

/// POST /nlp/generate: reply plus the action signal for the ordering system.
pub async fn generate_response(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResult>> {
    validate_message("user_message", &req.user_message)?;
    validate_user_id(&req.user_id)?;

    let result = state
        .inference
        .resolve(&req.user_message, req.context)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %req.user_id, error = %e, "reply generation failed");
            ApiError::Internal(e.to_string())
        })?;

    let generated = GenerateResult::from(result);
    tracing::info!(
        user_id = %req.user_id,
        intent = %generated.intent,
        requires_action = generated.requires_action,
        "reply generated"
    );
    Ok(Json(generated))
}
