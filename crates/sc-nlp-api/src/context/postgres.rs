//! PostgreSQL context store.

use std::time::Duration;

use async_trait::async_trait;
use sc_protocol::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{ContextError, ContextStore, expiry_after};

const DELETE_EXPIRED: &str = "DELETE FROM conversation_contexts WHERE expires_at <= now()";

/// Contexts in the `conversation_contexts` table.
///
/// Expired rows are deleted on every save, so the table only holds live
/// users plus whatever expired since the last write.
#[derive(Clone)]
pub struct PgContextStore {
    pool: PgPool,
}

impl PgContextStore {
    /// Connect to PostgreSQL and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self, ContextError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        tracing::info!("running database migrations");
        sqlx::raw_sql(include_str!("../../migrations/001_contexts.sql"))
            .execute(&pool)
            .await?;
        tracing::info!("migrations complete");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContextStore for PgContextStore {
    async fn save(
        &self,
        user_id: &str,
        context: &Context,
        ttl: Duration,
    ) -> Result<(), ContextError> {
        let swept = sqlx::query(DELETE_EXPIRED)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if swept > 0 {
            tracing::debug!(swept, "deleted expired contexts");
        }

        sqlx::query(
            "INSERT INTO conversation_contexts (user_id, context, expires_at, updated_at)
             VALUES ($1, $2, $3, now())
             ON CONFLICT (user_id)
             DO UPDATE SET
                 context = EXCLUDED.context,
                 expires_at = EXCLUDED.expires_at,
                 updated_at = now()",
        )
        .bind(user_id)
        .bind(serde_json::Value::Object(context.clone()))
        .bind(expiry_after(ttl))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<Context>, ContextError> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT context FROM conversation_contexts
             WHERE user_id = $1 AND expires_at > now()",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some((serde_json::Value::Object(map),)) => Ok(Some(map)),
            Some(_) => Err(ContextError::Corrupt {
                user_id: user_id.to_string(),
            }),
        }
    }

    async fn ping(&self) -> Result<(), ContextError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "postgres"
    }
}
