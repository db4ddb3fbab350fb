//! Route definitions for the `/items` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::items;
use crate::state::AppState;

/// Largest accepted import workbook.
const MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Routes mounted at `/items`.
///
/// ```text
/// GET    /         -> list (?q)
/// POST   /         -> create
/// POST   /import   -> import (.xlsx multipart)
/// PUT    /{id}     -> update
/// DELETE /{id}     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(items::list).post(items::create))
        .route(
            "/import",
            post(items::import).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES)),
        )
        .route("/{id}", put(items::update).delete(items::delete))
}
