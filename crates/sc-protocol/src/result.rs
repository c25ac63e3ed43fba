use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::intent::Intent;

/// Opaque per-user conversation state owned by the session layer.
///
/// Passed through untouched; nothing in the pipeline reads its keys.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Which resolution path produced a [`ParseResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceTier {
    /// External generative model returned parseable output.
    Model,
    /// No model credential configured; rule-based pipeline answered.
    Rules,
    /// Model call failed or returned unparseable output.
    Degraded,
}

/// Outcome of understanding one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub intent: Intent,
    pub entities: Vec<Entity>,
    pub confidence: f64,
    /// Reply to show the user.
    pub response: String,
    /// Echo of the caller's context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    pub tier: InferenceTier,
}

/// Reply plus the action signal for the ordering system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResult {
    pub response: String,
    pub intent: Intent,
    pub requires_action: bool,
    /// Intent name, omitted for `help`.
    pub action_type: Option<String>,
}

impl From<ParseResult> for GenerateResult {
    fn from(parsed: ParseResult) -> Self {
        let intent = parsed.intent;
        Self {
            response: parsed.response,
            intent,
            requires_action: intent.requires_action(),
            action_type: (intent != Intent::Help).then(|| intent.as_str().to_string()),
        }
    }
}
