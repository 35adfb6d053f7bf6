//! Notification log entity models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A sent (or attempted) notification, as stored in `notification_logs`.
///
/// Append-only except the response-tracking columns, which are filled in
/// when the user reacts to the message.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationLog {
    pub id: i64,
    pub user_id: String,
    pub mission_id: Option<String>,
    pub notification_type: String,
    pub message: String,
    pub delivery_channel: Option<String>,
    pub delivery_status: String,
    pub batch_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: DateTime<Utc>,
    pub response_action: Option<String>,
    pub response_time: Option<DateTime<Utc>>,
    pub effectiveness: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for inserting a new notification log row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationLog {
    pub user_id: String,
    pub mission_id: Option<String>,
    pub notification_type: String,
    pub message: String,
    pub delivery_channel: Option<String>,
    pub batch_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// DTO for recording how the user responded to a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordResponse {
    pub response_action: String,
    /// Self-reported or inferred effectiveness, `0.0..=1.0`.
    pub effectiveness: Option<f64>,
}
