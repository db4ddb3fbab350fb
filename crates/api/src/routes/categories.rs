//! Route definitions for category groups and sub-categories.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET    /groups      -> list_groups
/// POST   /groups      -> create_group (always 403)
/// GET    /subs        -> list_subs
/// POST   /subs        -> create_sub
/// PUT    /subs/{id}   -> update_sub
/// DELETE /subs/{id}   -> delete_sub
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/groups",
            get(categories::list_groups).post(categories::create_group),
        )
        .route(
            "/subs",
            get(categories::list_subs).post(categories::create_sub),
        )
        .route(
            "/subs/{id}",
            put(categories::update_sub).delete(categories::delete_sub),
        )
}
