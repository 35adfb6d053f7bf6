//! Goal service REST client.
//!
//! The goal service owns mission CRUD and history; this engine only reads
//! two projections from it. All failures map to `CoreError::Upstream`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use motivator_core::ports::GoalTracking;
use motivator_core::types::{DailyProgress, UserMissionSnapshot};
use motivator_core::CoreError;

/// Configuration for the goal service client.
#[derive(Debug, Clone)]
pub struct GoalServiceConfig {
    /// Base URL of the goal service (default: `http://localhost:8081`).
    pub base_url: String,
    /// Request timeout in seconds (default: `10`).
    pub timeout_secs: u64,
}

impl GoalServiceConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `GOAL_SERVICE_URL`          | `http://localhost:8081` |
    /// | `GOAL_SERVICE_TIMEOUT_SECS` | `10`                    |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("GOAL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8081".into());
        let timeout_secs: u64 = std::env::var("GOAL_SERVICE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("GOAL_SERVICE_TIMEOUT_SECS must be a valid u64");
        Self {
            base_url,
            timeout_secs,
        }
    }
}

/// Envelope the goal service wraps every response in.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// REST client for the goal service.
pub struct GoalServiceClient {
    config: GoalServiceConfig,
    http: reqwest::Client,
}

impl GoalServiceClient {
    pub fn new(config: GoalServiceConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self { config, http }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let url = format!("{}{path}", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Upstream(format!("goal service request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Upstream(format!(
                "goal service returned {status} for {path}"
            )));
        }

        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|e| CoreError::Upstream(format!("malformed goal service response: {e}")))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl GoalTracking for GoalServiceClient {
    async fn daily_progress(&self, user_id: &str) -> Result<DailyProgress, CoreError> {
        tracing::debug!(user_id, "fetching daily progress");
        self.get_json(&format!("/api/goals/users/{user_id}/daily-progress"))
            .await
    }

    async fn users_with_active_missions(&self) -> Result<Vec<UserMissionSnapshot>, CoreError> {
        tracing::debug!("fetching users with active missions");
        self.get_json("/api/goals/users/active-missions").await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
