//! Anthropic Messages API client for the model tier.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ModelClient, ModelError, ModelRequest};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Maximum characters of an error body kept in `ModelError::Status`.
const ERROR_BODY_LIMIT: usize = 320;

/// Configuration for the external model.
#[derive(Clone, Deserialize)]
pub struct ModelConfig {
    /// API key. Absent or blank disables the model tier.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Full Messages API URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl ModelConfig {
    /// The API key, if one is configured and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.credential().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Messages API request body.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Messages API response (only fields we need).
#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, config: &ModelConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.user_content,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status,
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        let text = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(ModelError::EmptyOutput);
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Build an Anthropic Messages response body.
    fn messages_response(blocks: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": blocks,
            "stop_reason": "end_turn"
        })
    }

    fn client_for(server: &MockServer, timeout_secs: u64) -> AnthropicClient {
        let config = ModelConfig {
            api_key: Some("sk-test".into()),
            model: "claude-test".into(),
            endpoint: format!("{}/v1/messages", server.uri()),
            timeout_secs,
        };
        AnthropicClient::new("sk-test", &config).unwrap()
    }

    fn request() -> ModelRequest {
        ModelRequest {
            system: "be terse".into(),
            user_content: "User message: hi\n\nContext: None".into(),
            max_tokens: 500,
        }
    }

    #[tokio::test]
    async fn returns_text_and_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-test",
                "max_tokens": 500,
                "system": "be terse",
                "messages": [{"role": "user", "content": "User message: hi\n\nContext: None"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(messages_response(
                serde_json::json!([{"type": "text", "text": "{\"intent\": \"greeting\"}"}]),
            )))
            .mount(&server)
            .await;

        let text = client_for(&server, 2).complete(&request()).await.unwrap();
        assert_eq!(text, "{\"intent\": \"greeting\"}");
    }

    #[tokio::test]
    async fn joins_text_blocks_and_skips_others() {
        let server = MockServer::start().await;
        let blocks = serde_json::json!([
            {"type": "text", "text": "first"},
            {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
            {"type": "text", "text": "second"}
        ]);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(messages_response(blocks)))
            .mount(&server)
            .await;

        let text = client_for(&server, 2).complete(&request()).await.unwrap();
        assert_eq!(text, "first\nsecond");
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        let err = client_for(&server, 2).complete(&request()).await.unwrap_err();
        match err {
            ModelError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid"));
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(messages_response(serde_json::json!([]))),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 2).complete(&request()).await.unwrap_err();
        assert!(matches!(err, ModelError::EmptyOutput));
    }

    #[tokio::test]
    async fn garbage_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, 2).complete(&request()).await.unwrap_err();
        assert!(matches!(err, ModelError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_server_hits_client_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(messages_response(serde_json::json!([])))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        // Client timeout is 1s, mock delays 5s
        let err = client_for(&server, 1).complete(&request()).await.unwrap_err();
        assert!(matches!(err, ModelError::Http(_)));
    }

    #[test]
    fn config_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert_eq!(config.endpoint, "https://api.anthropic.com/v1/messages");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.credential().is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ModelConfig {
            api_key: Some("sk-super-secret".into()),
            ..ModelConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-super-secret"));
        assert!(printed.contains("REDACTED"));
    }
}
