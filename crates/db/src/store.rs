//! Postgres-backed implementation of the `NotificationLog` port.

use async_trait::async_trait;

use motivator_core::ports::NotificationLog;
use motivator_core::types::NewNotificationRecord;
use motivator_core::CoreError;

use crate::models::notification_log::CreateNotificationLog;
use crate::repositories::NotificationLogRepo;
use crate::DbPool;

/// Adapts the notification log repository to the engine's port.
pub struct PgNotificationLog {
    pool: DbPool,
}

impl PgNotificationLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLog for PgNotificationLog {
    async fn append(&self, record: NewNotificationRecord) -> Result<i64, CoreError> {
        let create = CreateNotificationLog {
            user_id: record.user_id,
            mission_id: record.mission_id,
            notification_type: record.notification_type,
            message: record.message,
            delivery_channel: None,
            batch_id: record.batch_id,
            scheduled_at: None,
        };
        let row = NotificationLogRepo::create(&self.pool, &create)
            .await
            .map_err(|e| CoreError::Persistence(format!("failed to append notification: {e}")))?;
        Ok(row.id)
    }
}
