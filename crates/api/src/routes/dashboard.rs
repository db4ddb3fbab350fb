//! Route definitions for the `/dashboard` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET /summary                    -> summary
/// GET /detail                     -> detail (?item_id, limit, offset)
/// GET /detail/{item_id}/export    -> export_detail
/// GET /export                     -> export (?mode=with-master|valuated)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(dashboard::summary))
        .route("/detail", get(dashboard::detail))
        .route("/detail/{item_id}/export", get(dashboard::export_detail))
        .route("/export", get(dashboard::export))
}
