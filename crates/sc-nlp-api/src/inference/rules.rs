//! Rule-based inference engine: classifier, extractor and templates composed.
//!
//! Answers every message at zero cost and sub-millisecond latency. Used
//! directly when no model credential is configured.

use std::sync::Arc;

use async_trait::async_trait;
use sc_nlp_rules::{LexiconTagger, Tagger, classify_intent, extract_entities, synthesize};
use sc_protocol::{Context, InferenceTier, ParseResult};

use super::{InferenceEngine, ResolveError};

/// Deterministic pipeline: intent → entities → reply.
#[derive(Clone)]
pub struct RuleBasedEngine {
    tagger: Option<Arc<dyn Tagger>>,
}

impl RuleBasedEngine {
    /// Engine with an explicit tagger, or none at all.
    pub fn new(tagger: Option<Arc<dyn Tagger>>) -> Self {
        Self { tagger }
    }

    /// Engine backed by the built-in English lexicon tagger.
    pub fn with_lexicon() -> Self {
        Self::new(Some(Arc::new(LexiconTagger::new())))
    }

    pub fn tagger_name(&self) -> Option<&str> {
        self.tagger.as_deref().map(|t| t.name())
    }

    /// Run the three stages in order. Never fails.
    pub fn parse(&self, message: &str, context: Option<Context>) -> ParseResult {
        let tagger = self.tagger.as_deref();
        let classification = classify_intent(message, tagger);
        let entities = extract_entities(message, tagger);
        let response = synthesize(classification.intent, &entities);

        ParseResult {
            intent: classification.intent,
            entities,
            confidence: classification.confidence,
            response,
            context,
            tier: InferenceTier::Rules,
        }
    }
}

impl Default for RuleBasedEngine {
    fn default() -> Self {
        Self::with_lexicon()
    }
}

#[async_trait]
impl InferenceEngine for RuleBasedEngine {
    async fn resolve(
        &self,
        message: &str,
        context: Option<Context>,
    ) -> Result<ParseResult, ResolveError> {
        Ok(self.parse(message, context))
    }

    fn model_enabled(&self) -> bool {
        false
    }

    fn tagger_name(&self) -> Option<&str> {
        RuleBasedEngine::tagger_name(self)
    }

    fn tier_name(&self) -> &str {
        "rules"
    }
}
