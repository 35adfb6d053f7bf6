use std::sync::Arc;

use chrono::{Local, Utc};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motivator_cache::MemoryCache;
use motivator_claude::{ClaudeClient, ClaudeConfig};
use motivator_core::batch::{BatchRequest, BatchService};
use motivator_core::ports::{Cache, GoalTracking, TextGeneration};
use motivator_goal::{GoalServiceClient, GoalServiceConfig};
use motivator_worker::{duration_until_next_run, parse_run_at, DEFAULT_RUN_AT};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motivator_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let run_at_raw = std::env::var("BATCH_RUN_AT").unwrap_or_else(|_| DEFAULT_RUN_AT.into());
    let run_at = parse_run_at(&run_at_raw)
        .unwrap_or_else(|| panic!("BATCH_RUN_AT must be HH:MM, got '{run_at_raw}'"));

    // --- Port adapters ---
    let goals: Arc<dyn GoalTracking> = Arc::new(GoalServiceClient::new(GoalServiceConfig::from_env()));
    let textgen: Arc<dyn TextGeneration> = Arc::new(ClaudeClient::new(ClaudeConfig::from_env()));
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());

    let batch = BatchService::new(goals, textgen, cache);

    // --- Shutdown ---
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT (Ctrl-C), stopping worker");
            signal_cancel.cancel();
        }
    });

    tracing::info!(run_at = %run_at, "Batch worker started");

    loop {
        let wait = duration_until_next_run(Local::now().naive_local(), run_at);
        tracing::info!(wait_secs = wait.as_secs(), "Sleeping until next scheduled run");

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(wait) => {}
        }

        let request = BatchRequest {
            trigger_time: Utc::now().to_rfc3339(),
            target_users: vec![],
            notification_type: "scheduled_daily".into(),
        };

        match batch.run_batch(&request, &cancel).await {
            Ok(result) => {
                tracing::info!(
                    batch_id = %result.batch_id,
                    processed_count = result.processed_count,
                    success_count = result.success_count,
                    failed_count = result.failed_count,
                    "Scheduled batch run finished"
                );
            }
            Err(err) => {
                tracing::error!(error = %err, "Scheduled batch run failed");
            }
        }

        if cancel.is_cancelled() {
            break;
        }
    }

    tracing::info!("Batch worker stopped");
}
