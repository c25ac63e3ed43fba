//! SmartCart NLP service: conversational grocery ordering API.
//!
//! Turns shopper messages into intents, product entities and replies.
//! Uses the external model when a credential is configured, the
//! rule-based pipeline otherwise.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sc_nlp_api::config::ApiConfig;
use sc_nlp_api::context::{ContextStore, MemoryContextStore, PgContextStore};
use sc_nlp_api::routes::build_router;
use sc_nlp_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sc-nlp-api starting");

    let config_path = std::env::args().nth(1);
    let config = ApiConfig::load(config_path.as_deref())?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        context_ttl_secs = config.context_ttl_secs,
        model = ?config.model,
        "configuration loaded"
    );

    // PostgreSQL if a database URL is configured, otherwise in-memory contexts.
    let contexts: Arc<dyn ContextStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("connecting to PostgreSQL");
            Arc::new(PgContextStore::connect(database_url).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, conversation contexts are kept in memory");
            Arc::new(MemoryContextStore::new())
        }
    };

    let state = AppState::from_config(&config, contexts)?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
