//! Message parsing endpoint.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sc_protocol::{Context, Entity, InferenceTier, Intent, ParseResult};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Longest accepted message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Accepted language tags.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "hi"];

/// Request body for parsing a message.
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    /// Raw user text.
    pub message: String,
    pub user_id: String,
    /// Conversation state from the session layer.
    #[serde(default)]
    pub context: Option<Context>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl ParseRequest {
    fn validate(&self) -> ApiResult<()> {
        validate_message("message", &self.message)?;
        validate_user_id(&self.user_id)?;
        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "unsupported language '{}', expected one of {SUPPORTED_LANGUAGES:?}",
                self.language
            )));
        }
        Ok(())
    }
}

/// Response body for a parsed message.
#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub intent: Intent,
    pub entities: Vec<Entity>,
    pub confidence: f64,
    pub suggested_response: String,
    pub context: Option<Context>,
    pub tier: InferenceTier,
}

impl From<ParseResult> for ParseResponse {
    fn from(result: ParseResult) -> Self {
        Self {
            intent: result.intent,
            entities: result.entities,
            confidence: result.confidence,
            suggested_response: result.response,
            context: result.context,
            tier: result.tier,
        }
    }
}

pub(crate) fn validate_message(field: &str, text: &str) -> ApiResult<()> {
    let len = text.chars().count();
    if len == 0 {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    if len > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "{field} is {len} characters, limit is {MAX_MESSAGE_CHARS}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_user_id(user_id: &str) -> ApiResult<()> {
    if user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id must not be empty".into()));
    }
    Ok(())
}

/// POST /nlp/parse: understand one message.
pub async fn parse_message(
    State(state): State<AppState>,
    Json(req): Json<ParseRequest>,
) -> ApiResult<Json<ParseResponse>> {
    req.validate()?;

    let request_id = Uuid::now_v7();
    tracing::info!(
        %request_id,
        user_id = %req.user_id,
        language = %req.language,
        engine = state.inference.tier_name(),
        "parsing message"
    );

    let result = state
        .inference
        .resolve(&req.message, req.context)
        .await
        .map_err(|e| {
            tracing::error!(%request_id, error = %e, "message resolution failed");
            ApiError::Internal(e.to_string())
        })?;

    tracing::info!(
        %request_id,
        intent = %result.intent,
        tier = ?result.tier,
        confidence = result.confidence,
        entities = result.entities.len(),
        "message parsed"
    );

    Ok(Json(ParseResponse::from(result)))
}
