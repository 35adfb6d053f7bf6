pub mod health;
pub mod motivation;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /notifications/encouragement   POST  on-demand encouragement
/// /batch/notifications           POST  bulk notification trigger
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(motivation::router())
}
