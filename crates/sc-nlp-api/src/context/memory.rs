//! In-process context store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sc_protocol::Context;
use tokio::sync::RwLock;

use super::{ContextError, ContextStore, expiry_after};

struct StoredContext {
    context: Context,
    expires_at: DateTime<Utc>,
}

/// Contexts held in a map behind one lock. Lost on restart.
///
/// Expired entries are dropped when read and swept on every save, so the
/// map only grows with live users.
#[derive(Default)]
pub struct MemoryContextStore {
    entries: RwLock<HashMap<String, StoredContext>>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextStore for MemoryContextStore {
    async fn save(
        &self,
        user_id: &str,
        context: &Context,
        ttl: Duration,
    ) -> Result<(), ContextError> {
        let stored = StoredContext {
            context: context.clone(),
            expires_at: expiry_after(ttl),
        };
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, stored| stored.expires_at > now);
        entries.insert(user_id.to_string(), stored);
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<Context>, ContextError> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                None => return Ok(None),
                Some(stored) if stored.expires_at > now => {
                    return Ok(Some(stored.context.clone()));
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // A concurrent save may have refreshed it since the read.
        match entries.get(user_id) {
            Some(stored) if stored.expires_at > now => Ok(Some(stored.context.clone())),
            Some(_) => {
                entries.remove(user_id);
                tracing::debug!(user_id, "dropped expired context");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), ContextError> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
