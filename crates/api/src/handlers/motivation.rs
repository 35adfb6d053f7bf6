//! Handlers for the encouragement and batch notification endpoints.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use motivator_core::batch::BatchRequest;
use motivator_core::types::{EncouragementMessage, MissionState};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Delay until the next automatic batch run advertised to callers.
const NEXT_RUN_DELAY_HOURS: i64 = 2;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /api/v1/notifications/encouragement`.
#[derive(Debug, Deserialize, Validate)]
pub struct EncouragementRequest {
    /// User to encourage.
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    /// Today's mission completion states for the user.
    #[validate(length(min = 1, message = "at least one mission state is required"))]
    pub missions: Vec<MissionState>,
}

/// Body for `POST /api/v1/batch/notifications`.
///
/// All fields are optional; an empty body triggers a full-population run.
#[derive(Debug, Default, Deserialize)]
pub struct BatchTriggerRequest {
    /// Caller-supplied trigger timestamp, echoed in logs. Defaults to now.
    pub trigger_time: Option<String>,
    /// Restrict the run to these users; empty means the whole population.
    #[serde(default)]
    pub target_users: Vec<String>,
    /// Label recorded with the run. Defaults to `daily_encouragement`.
    pub notification_type: Option<String>,
}

/// Report returned by the batch trigger endpoint.
#[derive(Debug, Serialize)]
pub struct BatchTriggerResponse {
    pub batch_id: String,
    pub processed_count: u32,
    pub success_count: u32,
    pub failed_count: u32,
    /// When the next automatic run is expected.
    pub next_scheduled_time: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/encouragement
///
/// Produce a personalized encouragement message for one user.
pub async fn send_encouragement(
    State(state): State<AppState>,
    Json(request): Json<EncouragementRequest>,
) -> AppResult<Json<DataResponse<EncouragementMessage>>> {
    request.validate()?;

    let message = state
        .motivation
        .encourage(&request.user_id, &request.missions)
        .await?;

    Ok(Json(DataResponse { data: message }))
}

/// POST /api/v1/batch/notifications
///
/// Trigger a bulk notification run and return its report.
pub async fn trigger_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchTriggerRequest>,
) -> AppResult<Json<DataResponse<BatchTriggerResponse>>> {
    let batch_request = BatchRequest {
        trigger_time: request
            .trigger_time
            .unwrap_or_else(|| Utc::now().to_rfc3339()),
        target_users: request.target_users,
        notification_type: request
            .notification_type
            .unwrap_or_else(|| "daily_encouragement".into()),
    };

    let result = state
        .batch
        .run_batch(&batch_request, &state.shutdown)
        .await?;

    Ok(Json(DataResponse {
        data: BatchTriggerResponse {
            batch_id: result.batch_id,
            processed_count: result.processed_count,
            success_count: result.success_count,
            failed_count: result.failed_count,
            next_scheduled_time: Utc::now() + Duration::hours(NEXT_RUN_DELAY_HOURS),
        },
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
