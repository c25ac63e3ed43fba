//! Shared test harness for E2E integration tests.
//!
//! Builds the real router from `sc-nlp-api` with an in-memory context
//! store, optionally pointed at a `wiremock` stand-in for the model API.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sc_nlp_api::config::ApiConfig;
use sc_nlp_api::context::{ContextStore, MemoryContextStore};
use sc_nlp_api::routes::build_router;
use sc_nlp_api::state::AppState;

/// End-to-end test harness around the NLP router.
pub struct TestHarness {
    /// Application state shared with the router.
    pub state: AppState,
    /// Axum router for HTTP requests via `tower::oneshot`.
    pub router: Router,
    /// Context store behind the state, for direct assertions.
    pub contexts: Arc<MemoryContextStore>,
}

impl TestHarness {
    /// Harness with no model credential: every message takes the rules tier.
    pub fn rules_only() -> Self {
        Self::from_config(&ApiConfig::default())
    }

    /// Harness whose model endpoint is `server`, with the given timeout.
    pub fn with_model(server: &MockServer, timeout_secs: u64) -> Self {
        let mut config = ApiConfig::default();
        config.model.api_key = Some("sk-e2e".into());
        config.model.model = "claude-e2e".into();
        config.model.endpoint = format!("{}/v1/messages", server.uri());
        config.model.timeout_secs = timeout_secs;
        Self::from_config(&config)
    }

    fn from_config(config: &ApiConfig) -> Self {
        let contexts = Arc::new(MemoryContextStore::new());
        let store: Arc<dyn ContextStore> = contexts.clone();
        let state = AppState::from_config(config, store).unwrap();
        let router = build_router(state.clone());
        Self {
            state,
            router,
            contexts,
        }
    }

    /// POST a JSON body. Returns (HTTP status code, response JSON body).
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    /// GET a path. Returns (HTTP status code, response JSON body).
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// POST /nlp/parse for `user-e2e`.
    pub async fn parse(&self, message: &str) -> (StatusCode, serde_json::Value) {
        self.post_json(
            "/nlp/parse",
            serde_json::json!({ "message": message, "user_id": "user-e2e" }),
        )
        .await
    }

    /// POST /nlp/generate for `user-e2e`.
    pub async fn generate(&self, message: &str) -> (StatusCode, serde_json::Value) {
        self.post_json(
            "/nlp/generate",
            serde_json::json!({ "user_message": message, "user_id": "user-e2e" }),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }
}

/// Anthropic Messages response carrying `text` as its only content block.
pub fn model_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_e2e",
        "type": "message",
        "role": "assistant",
        "model": "claude-e2e",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}

/// Mount a mock that answers every Messages call with `response`.
pub async fn mount_model(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(response)
        .mount(server)
        .await;
}
