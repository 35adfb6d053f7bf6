//! Route definitions for the motivation endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::motivation;
use crate::state::AppState;

/// Routes mounted under `/api/v1`.
///
/// ```text
/// POST /notifications/encouragement -> send_encouragement
/// POST /batch/notifications         -> trigger_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications/encouragement",
            post(motivation::send_encouragement),
        )
        .route("/batch/notifications", post(motivation::trigger_batch))
}
