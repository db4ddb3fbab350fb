//! Session authentication extractors for Axum handlers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use hermas_core::error::CoreError;
use hermas_core::rbac::Permission;
use hermas_core::types::DbId;
use hermas_core::visibility::{BroadcastScopes, Viewer};
use hermas_db::models::role::Role;
use hermas_db::repositories::{RoleRepo, SessionRepo, UserRepo};

use crate::auth::jwt::validate_token;
use crate::auth::session::token_from_cookie;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a session token.
///
/// The token is read from `Authorization: Bearer <token>` or, for browser
/// requests, the session cookie. Every request re-loads the user and role,
/// so deactivation, role changes and revoked sessions apply immediately.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     user.require(Permission::ViewRaw)?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// The `user_sessions` row the token belongs to.
    pub session_id: DbId,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub parent_admin_id: Option<DbId>,
    pub role: Role,
    /// Scopes the admin role currently broadcasts to everyone.
    pub broadcast: BroadcastScopes,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admins hold every permission regardless of stored flags.
    pub fn can(&self, permission: Permission) -> bool {
        self.is_admin() || self.role.has(permission)
    }

    /// 403 "Permission denied" unless the role grants `permission`.
    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::debug!(
                user_id = self.user_id,
                permission = %permission,
                "Permission denied"
            );
            Err(AppError::forbidden("Permission denied"))
        }
    }

    pub fn viewer(&self) -> Viewer {
        Viewer {
            user_id: self.user_id,
            is_admin: self.is_admin(),
        }
    }
}

/// Session token from the `Authorization` header or the session cookie.
fn extract_token(headers: &HeaderMap) -> AppResult<String> {
    if let Some(header) = headers.get("authorization") {
        let value = header
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;
        let token = value.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })?;
        return Ok(token.trim().to_string());
    }
    token_from_cookie(headers).ok_or_else(|| AppError::unauthorized("Not authenticated"))
}

/// Resolve the signed-in user for a request.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> AppResult<AuthUser> {
    let token = extract_token(headers)?;

    let claims = validate_token(&token, &state.config.jwt)
        .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

    let session = SessionRepo::find_active(&state.pool, claims.sid)
        .await?
        .filter(|s| s.user_id == claims.sub)
        .ok_or_else(|| AppError::unauthorized("Session has been revoked"))?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
    if !user.is_active {
        return Err(AppError::unauthorized("Account is deactivated"));
    }

    let role = RoleRepo::find_by_id(&state.pool, user.role_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Internal(format!(
                "User {} references missing role {}",
                user.id, user.role_id
            )))
        })?;

    let broadcast = if role.is_admin() {
        role.grants.broadcast_scopes()
    } else {
        RoleRepo::find_admin(&state.pool)
            .await?
            .map(|admin| admin.grants.broadcast_scopes())
            .unwrap_or_default()
    };

    Ok(AuthUser {
        user_id: user.id,
        session_id: session.id,
        name: user.name,
        username: user.username,
        email: user.email,
        parent_admin_id: user.parent_admin_id,
        role,
        broadcast,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state).await
    }
}

/// Optional authentication for pages: anything short of a valid session is `None`.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(&parts.headers, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Core(CoreError::Unauthorized(_))) => Ok(MaybeAuthUser(None)),
            Err(err) => {
                tracing::warn!(error = %err, "Page authentication failed");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
