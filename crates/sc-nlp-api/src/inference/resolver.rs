//! Model-backed resolver with rule-based and degraded fallbacks.
//!
//! Per call:
//!
//! ```text
//! Start ─┬─ no credential ──────────────► rules pipeline ──► Done
//!        └─ credential ─► call model ─┬─ parsed ─► reconcile ─► Done
//!                                     └─ failed ─► degraded ──► Done
//! ```
//!
//! One attempt per call, bounded by a timeout. Model failures never
//! surface as errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::timeout;

use sc_nlp_rules::normalize_unit;
use sc_nlp_rules::synth::HELP_PROMPT;
use sc_protocol::{Context, Entity, InferenceTier, Intent, ParseResult, Unit, clamp_confidence};

use super::{
    AnthropicClient, InferenceEngine, ModelClient, ModelConfig, ModelError, ModelRequest,
    RuleBasedEngine,
};

/// Instructions sent with every model call.
const SYSTEM_PROMPT: &str = r#"You are an AI assistant for SmartCart, a grocery ordering platform.

Your role:
- Help customers find and order groceries via natural conversation
- Extract product names, quantities, and units from messages
- Be friendly, concise, and helpful
- Support both English and Hindi

When the user mentions products:
1. Identify the product name
2. Extract quantity and unit
3. Confirm understanding
4. Suggest related items if appropriate

Valid intents: add_to_cart, view_cart, checkout, track_order, search_product, help, greeting, remove_from_cart.
Valid units: kg, gram, liter, ml, piece, dozen, packet.

Respond with ONLY a JSON object (no markdown, no explanation):
{"intent": "<intent>", "entities": [{"product": "name", "quantity": 2, "unit": "kg"}], "response": "Your friendly response", "confidence": 0.95}"#;

/// Output budget for every model call.
pub const MAX_OUTPUT_TOKENS: u32 = 500;

/// Confidence of the degraded result.
pub const DEGRADED_CONFIDENCE: f64 = 0.7;

/// Used when the model omits a confidence (result or entity).
const DEFAULT_MODEL_CONFIDENCE: f64 = 0.8;

/// Used when the model omits its reply text.
const DEFAULT_RESPONSE: &str = "How can I help you?";

/// Unexpected internal fault while resolving a message.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to encode context: {0}")]
    ContextEncoding(#[from] serde_json::Error),
}

/// Outcome of the single model attempt.
enum ModelAttempt {
    Parsed(ParseResult),
    Failed { raw_output: Option<String> },
}

/// Single entry point for message understanding.
#[derive(Clone)]
pub struct Resolver {
    rules: RuleBasedEngine,
    model: Option<Arc<dyn ModelClient>>,
    timeout: Duration,
}

impl Resolver {
    /// Resolver with no model; every call takes the rules path.
    pub fn rules_only(rules: RuleBasedEngine) -> Self {
        Self {
            rules,
            model: None,
            timeout: ModelConfig::default().timeout(),
        }
    }

    /// Resolver that consults `model` first, bounded by `timeout`.
    pub fn with_model(rules: RuleBasedEngine, model: Arc<dyn ModelClient>, timeout: Duration) -> Self {
        Self {
            rules,
            model: Some(model),
            timeout,
        }
    }

    /// Build from configuration. A blank or missing API key disables the model.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let rules = RuleBasedEngine::with_lexicon();
        match config.credential() {
            Some(key) => {
                let client = AnthropicClient::new(key, config)?;
                tracing::info!(model = %config.model, endpoint = %config.endpoint, "model tier enabled");
                Ok(Self::with_model(rules, Arc::new(client), config.timeout()))
            }
            None => {
                tracing::info!("no model credential configured, using rule-based tier only");
                Ok(Self::rules_only(rules))
            }
        }
    }

    async fn attempt_model(
        &self,
        client: &dyn ModelClient,
        message: &str,
        context: Option<&Context>,
    ) -> Result<ModelAttempt, ResolveError> {
        let request = build_request(message, context)?;

        let raw = match timeout(self.timeout, client.complete(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(provider = client.name(), error = %e, "model call failed");
                return Ok(ModelAttempt::Failed { raw_output: None });
            }
            Err(_) => {
                let e = ModelError::Timeout(self.timeout);
                tracing::warn!(provider = client.name(), error = %e, "model call failed");
                return Ok(ModelAttempt::Failed { raw_output: None });
            }
        };

        match serde_json::from_str::<ModelOutput>(extract_json(&raw)) {
            Ok(output) => Ok(ModelAttempt::Parsed(output.into_result(context.cloned()))),
            Err(e) => {
                tracing::warn!(error = %e, "model output is not valid JSON");
                Ok(ModelAttempt::Failed {
                    raw_output: Some(raw),
                })
            }
        }
    }
}

#[async_trait]
impl InferenceEngine for Resolver {
    async fn resolve(
        &self,
        message: &str,
        context: Option<Context>,
    ) -> Result<ParseResult, ResolveError> {
        let Some(client) = self.model.as_deref() else {
            tracing::debug!(tier = "rules", "no model configured");
            return Ok(self.rules.parse(message, context));
        };

        let result = match self.attempt_model(client, message, context.as_ref()).await? {
            ModelAttempt::Parsed(result) => result,
            ModelAttempt::Failed { raw_output } => degraded(raw_output, context),
        };
        tracing::debug!(tier = ?result.tier, intent = %result.intent, "message resolved");
        Ok(result)
    }

    fn model_enabled(&self) -> bool {
        self.model.is_some()
    }

    fn tagger_name(&self) -> Option<&str> {
        self.rules.tagger_name()
    }

    fn tier_name(&self) -> &str {
        match &self.model {
            Some(client) => client.name(),
            None => "rules",
        }
    }
}

fn build_request(message: &str, context: Option<&Context>) -> Result<ModelRequest, ResolveError> {
    // An empty map carries no context, same as an absent one.
    let context_json = match context.filter(|ctx| !ctx.is_empty()) {
        Some(ctx) => serde_json::to_string(ctx)?,
        None => "None".to_string(),
    };
    Ok(ModelRequest {
        system: SYSTEM_PROMPT.to_string(),
        user_content: format!("User message: {message}\n\nContext: {context_json}"),
        max_tokens: MAX_OUTPUT_TOKENS,
    })
}

/// Fixed low-confidence answer after a failed model attempt.
fn degraded(raw_output: Option<String>, context: Option<Context>) -> ParseResult {
    let response = raw_output
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| HELP_PROMPT.to_string());
    ParseResult {
        intent: Intent::Help,
        entities: Vec::new(),
        confidence: DEGRADED_CONFIDENCE,
        response,
        context,
        tier: InferenceTier::Degraded,
    }
}

/// JSON shape requested from the model. Every field is optional.
#[derive(Debug, Deserialize)]
struct ModelOutput {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    entities: Vec<ModelEntity>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    confidence: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ModelEntity {
    #[serde(default)]
    product: Option<String>,
    #[serde(default)]
    quantity: Option<serde_json::Value>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    confidence: Option<serde_json::Value>,
}

impl ModelOutput {
    /// Reconcile the model's JSON into a [`ParseResult`].
    ///
    /// An intent outside the closed [`Intent`] set is replaced with
    /// [`Intent::Help`] and logged; callers never see a label they cannot
    /// route on.
    fn into_result(self, context: Option<Context>) -> ParseResult {
        let intent = match self.intent.as_deref() {
            None => Intent::Help,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(intent = raw, "model returned unknown intent, using help");
                Intent::Help
            }),
        };

        let entities = self
            .entities
            .into_iter()
            .filter_map(ModelEntity::into_entity)
            .collect();

        let confidence = self
            .confidence
            .as_ref()
            .and_then(as_number)
            .unwrap_or(DEFAULT_MODEL_CONFIDENCE);

        ParseResult {
            intent,
            entities,
            confidence: clamp_confidence(confidence),
            response: self
                .response
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RESPONSE.to_string()),
            context,
            tier: InferenceTier::Model,
        }
    }
}

impl ModelEntity {
    fn into_entity(self) -> Option<Entity> {
        let product = self.product.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        let Some(product) = product else {
            tracing::debug!("dropping model entity without a product name");
            return None;
        };
        let unit = self.unit.as_deref().map(normalize_unit).unwrap_or(Unit::Piece);
        let confidence = self
            .confidence
            .as_ref()
            .and_then(as_number)
            .unwrap_or(DEFAULT_MODEL_CONFIDENCE);
        Some(Entity::new(
            product,
            self.quantity.as_ref().and_then(as_number),
            unit,
            confidence,
        ))
    }
}

/// Read a JSON number, or a string holding one.
fn as_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract JSON from model output that may be wrapped in markdown code blocks.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns a fixed outcome and records the last request.
    struct ScriptedClient {
        outcome: fn() -> Result<String, ModelError>,
        last_request: Mutex<Option<ModelRequest>>,
    }

    impl ScriptedClient {
        fn new(outcome: fn() -> Result<String, ModelError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            (self.outcome)()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Never answers within any reasonable timeout.
    struct StalledClient;

    #[async_trait]
    impl ModelClient for StalledClient {
        async fn complete(&self, _request: &ModelRequest) -> Result<String, ModelError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("{}".into())
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    fn resolver_with(client: Arc<dyn ModelClient>) -> Resolver {
        Resolver::with_model(RuleBasedEngine::with_lexicon(), client, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn no_credential_equals_rules_pipeline() {
        let rules = RuleBasedEngine::with_lexicon();
        let resolver = Resolver::rules_only(rules.clone());
        let message = "I need 2kg tomatoes and 1 liter milk";

        let resolved = resolver.resolve(message, None).await.unwrap();
        assert_eq!(resolved, rules.parse(message, None));
        assert_eq!(resolved.intent, Intent::AddToCart);
        assert_eq!(resolved.confidence, 0.9);
        assert!(resolved.response.contains("to your cart"));
        assert!(!resolver.model_enabled());
        assert_eq!(resolver.tier_name(), "rules");
    }

    #[test]
    fn blank_key_builds_rules_only() {
        let config = ModelConfig {
            api_key: Some("   ".into()),
            ..ModelConfig::default()
        };
        let resolver = Resolver::from_config(&config).unwrap();
        assert!(!resolver.model_enabled());
    }

    #[test]
    fn key_builds_model_resolver() {
        let config = ModelConfig {
            api_key: Some("sk-test".into()),
            ..ModelConfig::default()
        };
        let resolver = Resolver::from_config(&config).unwrap();
        assert!(resolver.model_enabled());
        assert_eq!(resolver.tier_name(), "anthropic");
        assert_eq!(resolver.tagger_name(), Some("lexicon"));
    }

    #[tokio::test]
    async fn model_output_is_reconciled() {
        let client = ScriptedClient::new(|| {
            Ok(r#"{"intent": "add_to_cart",
                   "entities": [{"product": "Tomatoes", "quantity": 2, "unit": "KG"},
                                {"product": "Milk", "quantity": "1", "unit": "litre", "confidence": 0.95}],
                   "response": "Adding tomatoes and milk!",
                   "confidence": 0.95}"#
                .into())
        });
        let result = resolver_with(client)
            .resolve("2kg tomatoes and 1 litre milk", None)
            .await
            .unwrap();

        assert_eq!(result.tier, InferenceTier::Model);
        assert_eq!(result.intent, Intent::AddToCart);
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.response, "Adding tomatoes and milk!");
        assert_eq!(result.entities.len(), 2);
        assert_eq!(result.entities[0].unit, Unit::Kg);
        assert_eq!(result.entities[0].confidence, 0.8);
        assert_eq!(result.entities[1].quantity, 1.0);
        assert_eq!(result.entities[1].unit, Unit::Liter);
        assert_eq!(result.entities[1].confidence, 0.95);
    }

    #[tokio::test]
    async fn fenced_output_with_missing_fields_gets_defaults() {
        let client = ScriptedClient::new(|| {
            Ok("Sure!\n```json\n{\"entities\": [{\"product\": \"eggs\", \"quantity\": -3, \"unit\": \"crate\"}, {\"quantity\": 2}]}\n```".into())
        });
        let result = resolver_with(client).resolve("eggs", None).await.unwrap();

        assert_eq!(result.tier, InferenceTier::Model);
        assert_eq!(result.intent, Intent::Help);
        assert_eq!(result.response, "How can I help you?");
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].quantity, 1.0);
        assert_eq!(result.entities[0].unit, Unit::Piece);
    }

    #[tokio::test]
    async fn unknown_intent_becomes_help_and_confidence_is_clamped() {
        let client = ScriptedClient::new(|| {
            Ok(r#"{"intent": "reorder_last", "response": "Sure", "confidence": 7}"#.into())
        });
        let result = resolver_with(client).resolve("same as last week", None).await.unwrap();
        assert_eq!(result.intent, Intent::Help);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.tier, InferenceTier::Model);
    }

    #[tokio::test]
    async fn prose_output_degrades_with_raw_text() {
        let client = ScriptedClient::new(|| Ok("Happy to help with your groceries!".into()));
        let result = resolver_with(client).resolve("hmm", None).await.unwrap();

        assert_eq!(result.tier, InferenceTier::Degraded);
        assert_eq!(result.intent, Intent::Help);
        assert!(result.entities.is_empty());
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.response, "Happy to help with your groceries!");
    }

    #[tokio::test]
    async fn malformed_entities_degrade() {
        let client = ScriptedClient::new(|| Ok(r#"{"intent": "add_to_cart", "entities": "milk"}"#.into()));
        let result = resolver_with(client).resolve("milk", None).await.unwrap();
        assert_eq!(result.tier, InferenceTier::Degraded);
        assert_eq!(result.intent, Intent::Help);
    }

    #[tokio::test]
    async fn model_error_degrades_to_help_prompt() {
        let client = ScriptedClient::new(|| {
            Err(ModelError::Status {
                status: 529,
                body: "overloaded".into(),
            })
        });
        let result = resolver_with(client).resolve("I need milk", None).await.unwrap();

        assert_eq!(result.tier, InferenceTier::Degraded);
        assert_eq!(result.intent, Intent::Help);
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.response, HELP_PROMPT);
    }

    #[tokio::test]
    async fn timeout_degrades_without_error() {
        let resolver = resolver_with(Arc::new(StalledClient));
        let result = resolver.resolve("I need 2kg tomatoes", None).await.unwrap();

        assert_eq!(result.intent, Intent::Help);
        assert!(result.entities.is_empty());
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.tier, InferenceTier::Degraded);
    }

    #[tokio::test]
    async fn request_embeds_message_and_context() {
        let client = ScriptedClient::new(|| Ok(r#"{"intent": "view_cart"}"#.into()));
        let resolver = resolver_with(client.clone());

        let mut ctx = Context::new();
        ctx.insert("last_intent".into(), serde_json::json!("add_to_cart"));
        let result = resolver.resolve("show cart", Some(ctx.clone())).await.unwrap();
        assert_eq!(result.context, Some(ctx));

        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            request.user_content,
            "User message: show cart\n\nContext: {\"last_intent\":\"add_to_cart\"}"
        );
        assert_eq!(request.max_tokens, MAX_OUTPUT_TOKENS);
        assert!(request.system.contains("SmartCart"));

        resolver.resolve("show cart", None).await.unwrap();
        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert!(request.user_content.ends_with("Context: None"));
    }

    #[tokio::test]
    async fn empty_context_is_sent_as_none() {
        let client = ScriptedClient::new(|| Ok(r#"{"intent": "view_cart"}"#.into()));
        let resolver = resolver_with(client.clone());

        resolver.resolve("show cart", Some(Context::new())).await.unwrap();
        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.user_content, "User message: show cart\n\nContext: None");
    }

    #[test]
    fn extract_json_variants() {
        assert_eq!(extract_json(r#"  {"a": 1}  "#), r#"{"a": 1}"#);
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), r#"{"a": 1}"#);
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), r#"{"a": 1}"#);
    }
}
