//! Handlers for the `/roles` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hermas_core::types::DbId;
use hermas_db::models::role::{
    ensure_role_deletable, plan_role_create, plan_role_update, CreateRole, Role, UpdateRole,
};
use hermas_db::repositories::RoleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireManageRoles;
use crate::state::AppState;

/// GET /api/v1/roles
pub async fn list(
    RequireManageRoles(_user): RequireManageRoles,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Role>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(roles))
}

/// POST /api/v1/roles
pub async fn create(
    RequireManageRoles(user): RequireManageRoles,
    State(state): State<AppState>,
    Json(input): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<Role>)> {
    let plan = plan_role_create(&input)?;
    if RoleRepo::find_by_name(&state.pool, &plan.name).await?.is_some() {
        return Err(AppError::conflict("Role name already exists"));
    }

    let role = RoleRepo::create(&state.pool, &plan).await?;
    tracing::info!(role_id = role.id, actor = user.user_id, "Role created");
    Ok((StatusCode::CREATED, Json(role)))
}

/// PUT /api/v1/roles/{id}
pub async fn update(
    RequireManageRoles(user): RequireManageRoles,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRole>,
) -> AppResult<Json<Role>> {
    let current = RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Role", id))?;

    let plan = plan_role_update(&current, &input)?;
    if let Some(other) = RoleRepo::find_by_name(&state.pool, &plan.name).await? {
        if other.id != id {
            return Err(AppError::conflict("Role name already exists"));
        }
    }

    let role = RoleRepo::update(&state.pool, id, &plan)
        .await?
        .ok_or_else(|| AppError::not_found("Role", id))?;
    tracing::info!(role_id = id, actor = user.user_id, "Role updated");
    Ok(Json(role))
}

/// DELETE /api/v1/roles/{id}
pub async fn delete(
    RequireManageRoles(user): RequireManageRoles,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let role = RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Role", id))?;

    ensure_role_deletable(&role)?;

    if RoleRepo::count_users(&state.pool, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Role is assigned to users and cannot be deleted".into(),
        ));
    }

    RoleRepo::delete(&state.pool, id).await?;
    tracing::info!(role_id = id, actor = user.user_id, "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}
