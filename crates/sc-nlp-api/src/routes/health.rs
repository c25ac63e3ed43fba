//! Banner and health check endpoints.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /: service banner.
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "SmartCart NLP Service",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "ai_enabled": state.inference.model_enabled(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /health: dependency status. Always 200; `status` says whether
/// the service is running at full capability.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let model_enabled = state.inference.model_enabled();
    let store_ok = match state.contexts.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                backend = state.contexts.backend_name(),
                error = %e,
                "context store ping failed"
            );
            false
        }
    };

    Json(json!({
        "status": if model_enabled && store_ok { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "model": if model_enabled { "configured" } else { "not_configured" },
        "tagger": if state.inference.tagger_name().is_some() { "loaded" } else { "not_loaded" },
        "context_store": if store_ok { "connected" } else { "disconnected" },
        "context_backend": state.contexts.backend_name(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
