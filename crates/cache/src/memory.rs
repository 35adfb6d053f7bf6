//! Shared in-memory key/value store with per-entry expiry.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use motivator_core::ports::Cache;
use motivator_core::CoreError;

/// Retention for batch messages written via `store_batch_message`.
const BATCH_MESSAGE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Key prefix for per-user batch messages.
const BATCH_MESSAGE_PREFIX: &str = "batch_message:";

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-process TTL cache, safe for concurrent use behind `Arc`.
///
/// Expired entries are dropped lazily on read and swept opportunistically on
/// write; there is no background reaper.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries. Mainly for diagnostics and tests.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn insert(&self, key: String, value: String, ttl: Duration) {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(1));
        let mut entries = self.entries.write().await;
        // Sweep out anything already expired while we hold the write lock.
        let now = Utc::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(key, Entry { value, expires_at });
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Utc::now() => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CoreError> {
        self.insert(key.to_string(), value.to_string(), ttl).await;
        tracing::debug!(key, ttl_secs = ttl.as_secs(), "cache entry stored");
        Ok(())
    }

    async fn store_batch_message(&self, user_id: &str, message: &str) -> Result<(), CoreError> {
        let key = format!("{BATCH_MESSAGE_PREFIX}{user_id}");
        self.insert(key, message.to_string(), BATCH_MESSAGE_TTL)
            .await;
        tracing::debug!(user_id, "batch message stored");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
