pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod entries;
pub mod health;
pub mod items;
pub mod metrics;
pub mod roles;
pub mod users;
pub mod warehouses;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/google                                     Google sign-in (public)
/// /auth/login                                      password login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /bootstrap                                       current user + master data
///
/// /users                                           list, invite (can_manage_users)
/// /users/{id}                                      update, delete
///
/// /roles                                           list, create (can_manage_roles)
/// /roles/{id}                                      update, delete
///
/// /categories/groups                               list, create (always 403)
/// /categories/subs                                 list, create
/// /categories/subs/{id}                            update, delete
///
/// /warehouses                                      list, create
/// /warehouses/{id}                                 delete
///
/// /metrics                                         list, create
/// /metrics/{id}                                    delete
///
/// /items                                           list (?q), create
/// /items/import                                    .xlsx upload (POST)
/// /items/{id}                                      update, delete
///
/// /entries                                         list (?type), create
/// /entries/bulk-delete                             bulk delete (POST)
/// /entries/stream                                  WebSocket (admins only)
/// /entries/{id}                                    update, delete
///
/// /dashboard/summary                               cards + table
/// /dashboard/detail                                item detail (?item_id, limit, offset)
/// /dashboard/detail/{item_id}/export               item workbook
/// /dashboard/export                                dashboard workbook (?mode)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/bootstrap", get(handlers::bootstrap::bootstrap))
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .nest("/categories", categories::router())
        .nest("/warehouses", warehouses::router())
        .nest("/metrics", metrics::router())
        .nest("/items", items::router())
        .nest("/entries", entries::router())
        .nest("/dashboard", dashboard::router())
}
