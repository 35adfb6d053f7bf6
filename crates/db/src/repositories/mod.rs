//! Query operations, one repository per table.

pub mod notification_log_repo;

pub use notification_log_repo::NotificationLogRepo;
