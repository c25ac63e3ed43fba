//! Shared application state for the Axum server.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::context::{ContextStore, MemoryContextStore};
use crate::inference::{InferenceEngine, ModelError, Resolver, RuleBasedEngine};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Message understanding (model tier with fallbacks).
    pub inference: Arc<dyn InferenceEngine>,
    /// Conversation context persistence.
    pub contexts: Arc<dyn ContextStore>,
    /// Lifetime of saved contexts.
    pub context_ttl: Duration,
}

impl AppState {
    /// Rules-only resolver with an in-memory context store (tests, development).
    pub fn new() -> Self {
        Self {
            inference: Arc::new(Resolver::rules_only(RuleBasedEngine::with_lexicon())),
            contexts: Arc::new(MemoryContextStore::new()),
            context_ttl: Duration::from_secs(3600),
        }
    }

    /// Build from configuration around an already-connected context store.
    pub fn from_config(
        config: &ApiConfig,
        contexts: Arc<dyn ContextStore>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            inference: Arc::new(Resolver::from_config(&config.model)?),
            contexts,
            context_ttl: Duration::from_secs(config.context_ttl_secs),
        })
    }

    /// Replace the inference engine.
    pub fn with_inference(mut self, inference: Arc<dyn InferenceEngine>) -> Self {
        self.inference = inference;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
