use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use motivator_core::batch::BatchService;
use motivator_core::encourage::MotivationService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: motivator_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// On-demand encouragement orchestrator.
    pub motivation: Arc<MotivationService>,
    /// Bulk notification orchestrator.
    pub batch: Arc<BatchService>,
    /// Centralized event bus for publishing engine events.
    pub event_bus: Arc<motivator_events::EventBus>,
    /// Cancelled on shutdown; batch runs stop at the next unit boundary.
    pub shutdown: CancellationToken,
}
