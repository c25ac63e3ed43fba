//! NLP service configuration, loadable from TOML and/or environment.

use serde::Deserialize;

use crate::inference::ModelConfig;

/// Top-level API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// PostgreSQL URL for context storage. None keeps contexts in memory.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Lifetime of a saved conversation context.
    #[serde(default = "default_context_ttl_secs")]
    pub context_ttl_secs: u64,
    /// External model settings. No API key means rule-based only.
    #[serde(default)]
    pub model: ModelConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_context_ttl_secs() -> u64 {
    3600
}

impl ApiConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Optional TOML file first, then environment overrides.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from `lookup` (normally `std::env::var`).
    ///
    /// Unparseable numeric values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.port = port;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(ttl) = lookup("CONTEXT_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.context_ttl_secs = ttl;
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(model) = lookup("ANTHROPIC_MODEL") {
            self.model.model = model;
        }
        if let Some(base) = lookup("ANTHROPIC_BASE_URL") {
            self.model.endpoint = format!("{}/v1/messages", base.trim_end_matches('/'));
        }
        if let Some(secs) = lookup("MODEL_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.model.timeout_secs = secs;
        }
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            context_ttl_secs: default_context_ttl_secs(),
            model: ModelConfig::default(),
        }
    }
}
