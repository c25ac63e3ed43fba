//! Conversation context endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use sc_protocol::Context;

use super::parse::validate_user_id;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /nlp/context/{user_id}: store the user's context with the configured TTL.
pub async fn save_context(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(context): Json<Context>,
) -> ApiResult<Json<Value>> {
    validate_user_id(&user_id)?;
    state
        .contexts
        .save(&user_id, &context, state.context_ttl)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "failed to save context");
            ApiError::ServiceUnavailable(e.to_string())
        })?;

    tracing::debug!(user_id = %user_id, keys = context.len(), "context saved");
    Ok(Json(json!({ "success": true, "message": "Context saved" })))
}

/// GET /nlp/context/{user_id}: the user's context, `{}` when absent or expired.
pub async fn get_context(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Context>> {
    validate_user_id(&user_id)?;
    let context = state.contexts.load(&user_id).await.map_err(|e| {
        tracing::error!(user_id = %user_id, error = %e, "failed to load context");
        ApiError::ServiceUnavailable(e.to_string())
    })?;
    Ok(Json(context.unwrap_or_default()))
}
