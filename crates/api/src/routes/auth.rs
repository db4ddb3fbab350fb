//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Sign-in routes, mounted at `/auth`. Only `/logout` needs a session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google", post(auth::google))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}
