//! Database entity models and DTOs.

pub mod notification_log;

pub use notification_log::{CreateNotificationLog, NotificationLog, RecordResponse};
