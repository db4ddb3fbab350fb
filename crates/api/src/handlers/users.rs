//! Handlers for the `/users` resource: invitations and account management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hermas_core::types::DbId;
use hermas_core::users::{invite_display_name, is_protected_user, normalize_invite_email};
use hermas_db::models::user::{CreateUser, InviteUser, UpdateUser, User, UserResponse};
use hermas_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use rand::Rng;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireManageUsers;
use crate::state::AppState;

/// Length of a generated invitation token.
const INVITATION_TOKEN_LEN: usize = 32;

fn generate_invitation_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(INVITATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// GET /api/v1/users
pub async fn list(
    RequireManageUsers(_user): RequireManageUsers,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users))
}

/// POST /api/v1/users
///
/// Invite a Google account. The address becomes the username; the account
/// has no password and activates on its first Google sign-in.
pub async fn invite(
    RequireManageUsers(actor): RequireManageUsers,
    State(state): State<AppState>,
    Json(input): Json<InviteUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let email = normalize_invite_email(&input.email, &state.config.google.allowed_domain)?;

    if UserRepo::identity_taken(&state.pool, &email, &email).await? {
        return Err(AppError::BadRequest(
            "A user with this email already exists".into(),
        ));
    }

    RoleRepo::find_by_id(&state.pool, input.role_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Role not found".into()))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: invite_display_name(input.name.as_deref(), &email),
            username: email.clone(),
            email: Some(email),
            password_hash: None,
            invitation_token: Some(generate_invitation_token()),
            invited_by_id: Some(actor.user_id),
            role_id: input.role_id,
            parent_admin_id: actor.parent_admin_id.or(Some(actor.user_id)),
            dashboard_share_enabled: input.dashboard_share_enabled,
            is_active: input.is_active,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, invited_by = actor.user_id, "User invited");

    let response = load_response(&state, user.id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/v1/users/{id}
///
/// The bootstrap admin and the superuser only accept the share and active
/// flags, and always stay active.
pub async fn update(
    RequireManageUsers(actor): RequireManageUsers,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let target = find_user(&state, id).await?;

    if is_protected(&state, &target) {
        if input.touches_restricted_fields() {
            return Err(AppError::BadRequest(
                "Only sharing and active status can be changed for this account".into(),
            ));
        }
        if input.is_active.is_some() {
            input.is_active = Some(true);
        }
    }

    input.name = input
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    if let Some(role_id) = input.role_id {
        RoleRepo::find_by_id(&state.pool, role_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Role not found".into()))?;
    }

    if input.regenerate_invitation {
        if target.google_sub.is_some() {
            return Err(AppError::BadRequest(
                "User has already signed in with Google".into(),
            ));
        }
        UserRepo::set_invitation_token(&state.pool, id, &generate_invitation_token()).await?;
    }

    let updated = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    if !updated.is_active && target.is_active {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
        state.ws_manager.disconnect_user(id).await;
        tracing::info!(user_id = id, actor = actor.user_id, "User deactivated");
    }

    Ok(Json(load_response(&state, id).await?))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(
    RequireManageUsers(actor): RequireManageUsers,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == actor.user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".into(),
        ));
    }

    let target = find_user(&state, id).await?;
    if is_protected(&state, &target) {
        return Err(AppError::BadRequest("This account cannot be deleted".into()));
    }

    if UserRepo::count_entries(&state.pool, id).await? > 0 {
        return Err(AppError::conflict(
            "User has stock entries and cannot be deleted",
        ));
    }

    UserRepo::delete(&state.pool, id).await?;
    state.ws_manager.disconnect_user(id).await;
    tracing::info!(user_id = id, actor = actor.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

async fn load_response(state: &AppState, id: DbId) -> AppResult<UserResponse> {
    UserRepo::find_response(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

fn is_protected(state: &AppState, user: &User) -> bool {
    is_protected_user(
        &user.username,
        user.email.as_deref(),
        &state.config.google.superuser_email,
    )
}
