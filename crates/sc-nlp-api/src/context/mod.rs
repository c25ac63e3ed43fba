//! Per-user conversation context persistence.
//!
//! The pipeline never reads a context's keys; it only stores and returns
//! the blob for the session layer. Two backends:
//! - `MemoryContextStore`: process-local, used when no database is configured.
//! - `PgContextStore`: PostgreSQL `conversation_contexts` table.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use sc_protocol::Context;

pub use memory::MemoryContextStore;
pub use postgres::PgContextStore;

/// Failure in a context backend.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored context for {user_id} is not a JSON object")]
    Corrupt { user_id: String },
}

/// Storage for conversation contexts with expiry.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Replace the user's context; it expires after `ttl`.
    async fn save(&self, user_id: &str, context: &Context, ttl: Duration)
    -> Result<(), ContextError>;

    /// The user's context, or `None` if absent or expired.
    async fn load(&self, user_id: &str) -> Result<Option<Context>, ContextError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), ContextError>;

    /// Backend name (for logging).
    fn backend_name(&self) -> &str;
}

/// `ttl` as a chrono duration, saturating on overflow.
fn expiry_after(ttl: Duration) -> chrono::DateTime<chrono::Utc> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    chrono::Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC)
}
