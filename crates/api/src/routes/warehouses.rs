//! Route definitions for the `/warehouses` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::warehouses;
use crate::state::AppState;

/// Routes mounted at `/warehouses`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(warehouses::list).post(warehouses::create))
        .route("/{id}", delete(warehouses::delete))
}
