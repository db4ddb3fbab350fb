//! Route definitions for the `/entries` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::entries;
use crate::state::AppState;
use crate::ws;

/// Routes mounted at `/entries`.
///
/// ```text
/// GET    /              -> list (?type)
/// POST   /              -> create
/// POST   /bulk-delete   -> bulk_delete
/// GET    /stream        -> WebSocket entry stream (admins only)
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(entries::list).post(entries::create))
        .route("/bulk-delete", post(entries::bulk_delete))
        .route("/stream", get(ws::entry_stream))
        .route("/{id}", put(entries::update).delete(entries::delete))
}
