//! Message understanding for the NLP service.
//!
//! Converts shopper text ("I need 2kg tomatoes") into a `ParseResult`
//! with intent, entities, confidence and a reply.
//!
//! Two tiers:
//! - **Model** (cloud): an external generative model via `ModelClient`,
//!   used whenever a credential is configured.
//! - **Rules** (local): the deterministic `sc-nlp-rules` pipeline, used when
//!   no credential is configured.
//!
//! A configured model that fails or answers garbage yields a fixed
//! degraded result instead of an error.

pub mod anthropic;
pub mod resolver;
pub mod rules;

use std::time::Duration;

use async_trait::async_trait;
use sc_protocol::{Context, ParseResult};

pub use anthropic::{AnthropicClient, ModelConfig};
pub use resolver::{ResolveError, Resolver};
pub use rules::RuleBasedEngine;

/// Trait for engines that turn a message into a `ParseResult`.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Understand one message. Model unavailability is never an error here;
    /// only unexpected internal faults are.
    async fn resolve(
        &self,
        message: &str,
        context: Option<Context>,
    ) -> Result<ParseResult, ResolveError>;

    /// Whether an external model credential is configured.
    fn model_enabled(&self) -> bool;

    /// Name of the linguistic tagger in use, if any.
    fn tagger_name(&self) -> Option<&str>;

    /// Name of this engine (for logging).
    fn tier_name(&self) -> &str;
}

/// One request to an external generative model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system: String,
    pub user_content: String,
    /// Output budget in tokens.
    pub max_tokens: u32,
}

/// Failure talking to the external model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid model response: {0}")]
    Decode(String),

    #[error("model returned no text")]
    EmptyOutput,

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
}

/// Client for an external generative model.
///
/// Implementations make exactly one attempt per call; retries and
/// timeouts are the caller's concern.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the request and return the model's text output.
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError>;

    /// Provider name (for logging).
    fn name(&self) -> &str;
}
