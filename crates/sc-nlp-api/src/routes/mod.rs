//! API route definitions and router builder.

pub mod context;
pub mod generate;
pub mod health;
pub mod parse;

use axum::Router;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let nlp = Router::new()
        .route("/parse", post(parse::parse_message))
        .route("/generate", post(generate::generate_response))
        .route(
            "/context/{user_id}",
            get(context::get_context).post(context::save_context),
        );

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/nlp", nlp)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
