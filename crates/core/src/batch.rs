//! Batch orchestration: the end-to-end bulk notification run.
//!
//! Filter -> rank -> per-user compose-and-cache. Each user's unit of work
//! is isolated: its failure is counted and logged, never aborting the run.
//! The only hard failure mode is the population snapshot fetch before the
//! loop starts.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::compose::MessageComposer;
use crate::eligibility::{consecutive_failures, filter_users_needing_notification};
use crate::error::CoreError;
use crate::ports::{Cache, GoalTracking, TextGeneration};
use crate::ranking::prioritize_by_urgency;
use crate::types::{BatchRunResult, NotificationContext, UserMissionSnapshot};

/// Parameters of one batch trigger.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Caller-supplied trigger timestamp, echoed in logs.
    pub trigger_time: String,
    /// Restrict the run to these users; empty means the whole population.
    pub target_users: Vec<String>,
    /// Label recorded with the run, e.g. `daily_encouragement`.
    pub notification_type: String,
}

/// Project a mission snapshot into the batch composer's input.
pub fn notification_context(snapshot: &UserMissionSnapshot) -> NotificationContext {
    let rate = snapshot.completion_rate();
    NotificationContext {
        user_id: snapshot.user_id.clone(),
        completion_rate: rate,
        consecutive_failures: consecutive_failures(rate),
        last_active_time: snapshot.last_active_time,
        total_missions: snapshot.total_missions,
        completed_missions: snapshot.completed_missions,
    }
}

/// Drives the per-user loop of a batch run.
#[derive(Clone)]
pub struct BatchRunner {
    composer: MessageComposer,
    cache: Arc<dyn Cache>,
}

impl BatchRunner {
    pub fn new(textgen: Arc<dyn TextGeneration>, cache: Arc<dyn Cache>) -> Self {
        Self {
            composer: MessageComposer::new(textgen),
            cache,
        }
    }

    /// Process every ranked, eligible user independently.
    ///
    /// Cancellation is checked before each user's unit of work; a unit
    /// already started runs to completion or failure. Counters always
    /// satisfy `processed == success + failed`.
    pub async fn run(
        &self,
        prioritized: &[UserMissionSnapshot],
        batch_id: &str,
        cancel: &CancellationToken,
    ) -> BatchRunResult {
        tracing::info!(batch_id, user_count = prioritized.len(), "batch run started");

        let mut processed_count = 0u32;
        let mut success_count = 0u32;
        let mut failed_count = 0u32;

        for snapshot in prioritized {
            if cancel.is_cancelled() {
                tracing::warn!(batch_id, processed_count, "batch run cancelled");
                break;
            }

            processed_count += 1;
            match self.process_user(snapshot).await {
                Ok(()) => {
                    success_count += 1;
                    tracing::debug!(user_id = %snapshot.user_id, batch_id, "batch notification stored");
                }
                Err(err) => {
                    failed_count += 1;
                    tracing::error!(
                        user_id = %snapshot.user_id,
                        batch_id,
                        error = %err,
                        "batch notification failed"
                    );
                }
            }
        }

        tracing::info!(
            batch_id,
            processed_count,
            success_count,
            failed_count,
            "batch run finished"
        );

        BatchRunResult {
            batch_id: batch_id.to_string(),
            processed_count,
            success_count,
            failed_count,
        }
    }

    /// One user's unit of work: project, compose (with fallback), cache.
    async fn process_user(&self, snapshot: &UserMissionSnapshot) -> Result<(), CoreError> {
        let context = notification_context(snapshot);
        let message = self.composer.compose_batch(&context).await;
        self.cache
            .store_batch_message(&context.user_id, &message)
            .await
    }
}

/// Full batch orchestrator: population fetch, filter, rank, run.
pub struct BatchService {
    goals: Arc<dyn GoalTracking>,
    runner: BatchRunner,
}

impl BatchService {
    pub fn new(
        goals: Arc<dyn GoalTracking>,
        textgen: Arc<dyn TextGeneration>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            goals,
            runner: BatchRunner::new(textgen, cache),
        }
    }

    /// Execute one bulk run. A failed population fetch propagates as a hard
    /// failure; everything after the loop starts is best-effort per user.
    pub async fn run_batch(
        &self,
        request: &BatchRequest,
        cancel: &CancellationToken,
    ) -> Result<BatchRunResult, CoreError> {
        let local_time = Local::now().time();
        self.run_batch_at(request, Utc::now(), local_time, cancel)
            .await
    }

    /// [`run_batch`](Self::run_batch) with an explicit clock, for tests and
    /// replays.
    pub async fn run_batch_at(
        &self,
        request: &BatchRequest,
        now: DateTime<Utc>,
        local_time: NaiveTime,
        cancel: &CancellationToken,
    ) -> Result<BatchRunResult, CoreError> {
        let batch_id = format!("batch_{}", Uuid::now_v7().simple());
        tracing::info!(
            batch_id,
            trigger_time = %request.trigger_time,
            notification_type = %request.notification_type,
            target_count = request.target_users.len(),
            "batch trigger received"
        );

        let snapshots = self.goals.users_with_active_missions().await?;

        let targets: HashSet<String> = request.target_users.iter().cloned().collect();
        let eligible = filter_users_needing_notification(snapshots, local_time, &targets);
        let prioritized = prioritize_by_urgency(eligible, now);

        Ok(self.runner.run(&prioritized, &batch_id, cancel).await)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
