//! Capability traits for the engine's external collaborators.
//!
//! Implementations live in the adapter crates (`motivator-goal`,
//! `motivator-claude`, `motivator-cache`, `motivator-db`,
//! `motivator-events`) and are injected into the orchestrators by
//! construction as `Arc<dyn ...>`, never as ambient singletons.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{DailyProgress, NewNotificationRecord, UserMissionSnapshot};

/// Read access to the goal-tracking service.
#[async_trait]
pub trait GoalTracking: Send + Sync {
    /// Fetch one user's daily progress figures.
    async fn daily_progress(&self, user_id: &str) -> Result<DailyProgress, CoreError>;

    /// Snapshot of every user with at least one active mission.
    async fn users_with_active_missions(&self) -> Result<Vec<UserMissionSnapshot>, CoreError>;
}

/// Text-generation capability. May fail; callers must be prepared to fall
/// back to canned text.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, CoreError>;
}

/// Key/value cache with per-entry TTLs.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up a value; `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Store a value with the given time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CoreError>;

    /// Store a batch message for a user (24 h retention, fixed by the
    /// adapter). The delivery layer picks these up from the cache.
    async fn store_batch_message(&self, user_id: &str, message: &str) -> Result<(), CoreError>;
}

/// Append-only notification log.
#[async_trait]
pub trait NotificationLog: Send + Sync {
    /// Persist a record, returning its id.
    async fn append(&self, record: NewNotificationRecord) -> Result<i64, CoreError>;
}

/// Best-effort event publishing. Implementations swallow and log failures;
/// publishing never blocks or fails the caller.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, payload: serde_json::Value);
}
