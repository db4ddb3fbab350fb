//! Route definitions for the `/metrics` resource (units of measure).

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::metrics;
use crate::state::AppState;

/// Routes mounted at `/metrics`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(metrics::list).post(metrics::create))
        .route("/{id}", delete(metrics::delete))
}
