//! Route definitions for the `/roles` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::roles;
use crate::state::AppState;

/// Routes mounted at `/roles`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(roles::list).post(roles::create))
        .route("/{id}", put(roles::update).delete(roles::delete))
}
