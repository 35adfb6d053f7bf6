//! Repository for the `notification_logs` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::notification_log::{CreateNotificationLog, NotificationLog};

/// Column list for `notification_logs` queries.
const COLUMNS: &str = "\
    id, user_id, mission_id, notification_type, message, \
    delivery_channel, delivery_status, batch_id, \
    scheduled_at, sent_at, response_action, response_time, effectiveness, \
    created_at, updated_at";

/// Provides query operations for notification logs.
pub struct NotificationLogRepo;

impl NotificationLogRepo {
    /// Append a new log entry with delivery status "SENT".
    pub async fn create(
        pool: &PgPool,
        log: &CreateNotificationLog,
    ) -> Result<NotificationLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_logs \
             (user_id, mission_id, notification_type, message, \
              delivery_channel, batch_id, scheduled_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationLog>(&query)
            .bind(&log.user_id)
            .bind(&log.mission_id)
            .bind(&log.notification_type)
            .bind(&log.message)
            .bind(&log.delivery_channel)
            .bind(&log.batch_id)
            .bind(log.scheduled_at)
            .fetch_one(pool)
            .await
    }

    /// List a user's recent notifications, most recent first.
    pub async fn list_recent_for_user(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<NotificationLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_logs \
             WHERE user_id = $1 \
             ORDER BY sent_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, NotificationLog>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List every notification sent by one batch run, in send order.
    pub async fn list_for_batch(
        pool: &PgPool,
        batch_id: &str,
    ) -> Result<Vec<NotificationLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_logs \
             WHERE batch_id = $1 \
             ORDER BY sent_at ASC"
        );
        sqlx::query_as::<_, NotificationLog>(&query)
            .bind(batch_id)
            .fetch_all(pool)
            .await
    }

    /// Record the user's response to a notification.
    ///
    /// Returns `None` when the id does not exist.
    pub async fn record_response(
        pool: &PgPool,
        id: i64,
        response_action: &str,
        response_time: DateTime<Utc>,
        effectiveness: Option<f64>,
    ) -> Result<Option<NotificationLog>, sqlx::Error> {
        let query = format!(
            "UPDATE notification_logs \
             SET response_action = $2, response_time = $3, effectiveness = $4, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationLog>(&query)
            .bind(id)
            .bind(response_action)
            .bind(response_time)
            .bind(effectiveness)
            .fetch_optional(pool)
            .await
    }
}
