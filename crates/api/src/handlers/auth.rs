//! Handlers for the `/auth` resource (Google sign-in, password login,
//! refresh, logout).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use hermas_db::models::user::{CreateUser, User};
use hermas_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;

use crate::auth::google::{GoogleIdentity, IdentityError};
use crate::auth::jwt::hash_refresh_token;
use crate::auth::password::verify_password;
use crate::auth::session::{
    clear_session_cookie, open_session, session_cookie, user_agent, AuthResponse, UserInfo,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/google`.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    /// The ID token handed to the page by Google Identity Services.
    pub credential: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/google
///
/// Sign in with a Google ID token. The configured superuser is created or
/// promoted to admin; everyone else needs an existing account or a pending
/// invitation for their address.
pub async fn google(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<GoogleLoginRequest>,
) -> AppResult<Response> {
    let identity = state
        .identity
        .verify(&input.credential)
        .await
        .map_err(identity_error)?;

    let superuser = &state.config.google.superuser_email;
    let user = if !superuser.is_empty() && identity.email == *superuser {
        superuser_account(&state, &identity).await?
    } else {
        invited_account(&state, &identity).await?
    };

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Google sign-in");

    let response = start_session(&state, &user, &headers).await?;
    with_session_cookie(&state, response)
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password (the seeded Admin account).
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Response> {
    // 1. Find user by username (case-insensitive).
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

    // 2. Check if the account is active.
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    // 3. Check if the account is temporarily locked.
    if user.is_locked(Utc::now()) {
        return Err(AppError::forbidden(
            "Account is temporarily locked. Try again later.",
        ));
    }

    // 4. Google-only accounts have no password.
    let Some(password_hash) = user.password_hash.as_deref() else {
        return Err(AppError::unauthorized("Invalid username or password"));
    };

    let password_valid = verify_password(&input.password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 5. On failure: increment counter, lock if threshold exceeded.
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        let new_count = user.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after failed logins");
        }

        return Err(AppError::unauthorized("Invalid username or password"));
    }

    // 6. On success: reset failed count, set last_login_at.
    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let response = start_session(&state, &user, &headers).await?;
    with_session_cookie(&state, response)
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for a new session (token rotation).
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Response> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid or expired refresh token"))?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    let response = start_session(&state, &user, &headers).await?;
    with_session_cookie(&state, response)
}

/// POST /api/v1/auth/logout
///
/// Revoke every session of the caller, close their entry streams and clear
/// the cookie. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Response> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    state.ws_manager.disconnect_user(auth_user.user_id).await;
    tracing::info!(user_id = auth_user.user_id, revoked, "Logged out");

    let cookie = clear_session_cookie(&state.config)?;
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn identity_error(err: IdentityError) -> AppError {
    match err {
        IdentityError::NotConfigured => {
            AppError::BadRequest("Google sign-in is not configured".into())
        }
        IdentityError::InvalidToken(reason) => {
            tracing::debug!(%reason, "Rejected Google credential");
            AppError::unauthorized("Invalid Google credential")
        }
        IdentityError::EmailNotVerified => {
            AppError::unauthorized("Google account email is not verified")
        }
        IdentityError::KeyFetch(reason) => {
            AppError::InternalError(format!("Could not load Google signing keys: {reason}"))
        }
    }
}

/// Create or promote the configured superuser to an active admin.
async fn superuser_account(state: &AppState, identity: &GoogleIdentity) -> AppResult<User> {
    let admin_role = RoleRepo::find_admin(&state.pool).await?.ok_or_else(|| {
        AppError::InternalError("Admin role is missing; run hermas-seed".into())
    })?;

    let existing = match UserRepo::find_by_google_sub(&state.pool, &identity.sub).await? {
        Some(user) => Some(user),
        None => UserRepo::find_by_email(&state.pool, &identity.email).await?,
    };

    let user = match existing {
        Some(user) => {
            if user.google_sub.as_deref().is_some_and(|s| s != identity.sub) {
                return Err(AppError::forbidden(
                    "Email is linked to a different Google account",
                ));
            }
            user
        }
        None => {
            let created = UserRepo::create(
                &state.pool,
                &CreateUser {
                    name: identity
                        .name
                        .clone()
                        .unwrap_or_else(|| identity.email.clone()),
                    username: identity.email.clone(),
                    email: Some(identity.email.clone()),
                    password_hash: None,
                    invitation_token: None,
                    invited_by_id: None,
                    role_id: admin_role.id,
                    parent_admin_id: None,
                    dashboard_share_enabled: true,
                    is_active: true,
                },
            )
            .await?;
            tracing::info!(user_id = created.id, "Superuser account created");
            created
        }
    };

    if user.google_sub.is_none() {
        UserRepo::link_google(&state.pool, user.id, &identity.sub, &identity.email).await?;
    }
    Ok(UserRepo::promote(&state.pool, user.id, admin_role.id).await?)
}

/// Resolve a non-superuser Google identity to an existing or invited account.
async fn invited_account(state: &AppState, identity: &GoogleIdentity) -> AppResult<User> {
    let user = match UserRepo::find_by_google_sub(&state.pool, &identity.sub).await? {
        Some(user) => user,
        None => UserRepo::find_by_email(&state.pool, &identity.email)
            .await?
            .filter(|u| u.google_sub.is_some() || u.invitation_token.is_some())
            .ok_or_else(|| AppError::forbidden("This Google account has not been invited"))?,
    };

    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    match user.google_sub.as_deref() {
        Some(sub) if sub != identity.sub => Err(AppError::forbidden(
            "Email is linked to a different Google account",
        )),
        Some(_) => Ok(user),
        None => {
            let linked =
                UserRepo::link_google(&state.pool, user.id, &identity.sub, &identity.email)
                    .await?;
            tracing::info!(user_id = linked.id, "Invitation accepted");
            Ok(linked)
        }
    }
}

async fn start_session(state: &AppState, user: &User, headers: &HeaderMap) -> AppResult<AuthResponse> {
    let role = RoleRepo::find_by_id(&state.pool, user.role_id)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role {} not found", user.role_id)))?;

    open_session(
        state,
        UserInfo {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: role.name,
        },
        user_agent(headers),
    )
    .await
}

fn with_session_cookie(state: &AppState, response: AuthResponse) -> AppResult<Response> {
    let cookie = session_cookie(&state.config, &response.access_token)?;
    Ok(([(SET_COOKIE, cookie)], Json(response)).into_response())
}
