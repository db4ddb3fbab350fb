//! Handlers for category groups and sub-categories.
//!
//! Groups are fixed; only sub-categories under the official groups can be
//! managed from the UI.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hermas_core::inventory::{is_core_group, normalize_name};
use hermas_core::types::DbId;
use hermas_db::models::category::{
    Category, CategoryGroup, CategoryListParams, CreateCategory, UpdateCategory,
};
use hermas_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditManageData;
use crate::state::AppState;

/// GET /api/v1/categories/groups
///
/// Official groups only, in their fixed order.
pub async fn list_groups(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryGroup>>> {
    let groups = CategoryRepo::list_core_groups(&state.pool).await?;
    Ok(Json(groups))
}

/// POST /api/v1/categories/groups
pub async fn create_group(_user: AuthUser) -> AppResult<StatusCode> {
    Err(AppError::forbidden(
        "Inventory groups are managed centrally and cannot be created via the UI.",
    ))
}

/// GET /api/v1/categories/subs
pub async fn list_subs(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CategoryListParams>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryRepo::list(&state.pool, params.group_id).await?;
    Ok(Json(categories))
}

/// POST /api/v1/categories/subs
pub async fn create_sub(
    RequireEditManageData(user): RequireEditManageData,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let name = normalize_name(&input.name, "Sub-category name")?;
    ensure_official_group(&state, input.group_id).await?;
    ensure_name_free(&state, input.group_id, &name, None).await?;

    let category = CategoryRepo::create(&state.pool, &name, input.group_id).await?;
    tracing::info!(category_id = category.id, actor = user.user_id, "Sub-category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/v1/categories/subs/{id}
pub async fn update_sub(
    RequireEditManageData(user): RequireEditManageData,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    let current = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Sub-category", id))?;

    let name = match &input.name {
        Some(raw) => normalize_name(raw, "Sub-category name")?,
        None => current.name.clone(),
    };
    let group_id = input.group_id.unwrap_or(current.group_id);
    ensure_official_group(&state, group_id).await?;
    ensure_name_free(&state, group_id, &name, Some(id)).await?;

    let category = CategoryRepo::update(&state.pool, id, &name, group_id)
        .await?
        .ok_or_else(|| AppError::not_found("Sub-category", id))?;
    tracing::info!(category_id = id, actor = user.user_id, "Sub-category updated");
    Ok(Json(category))
}

/// DELETE /api/v1/categories/subs/{id}
pub async fn delete_sub(
    RequireEditManageData(user): RequireEditManageData,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Sub-category", id))?;

    let (items, entries) = CategoryRepo::usage(&state.pool, id).await?;
    if items > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a sub-category that is linked to items.".into(),
        ));
    }
    if entries > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a sub-category that has inventory entries.".into(),
        ));
    }

    CategoryRepo::delete(&state.pool, id).await?;
    tracing::info!(category_id = id, actor = user.user_id, "Sub-category deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_official_group(state: &AppState, group_id: DbId) -> AppResult<()> {
    let group = CategoryRepo::find_group(&state.pool, group_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Group not found".into()))?;
    if !is_core_group(&group.name) {
        return Err(AppError::BadRequest(
            "Sub-categories can only be attached to official inventory groups.".into(),
        ));
    }
    Ok(())
}

async fn ensure_name_free(
    state: &AppState,
    group_id: DbId,
    name: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if CategoryRepo::name_taken(&state.pool, group_id, name, exclude_id).await? {
        return Err(AppError::conflict(
            "Sub-category name already exists in this group",
        ));
    }
    Ok(())
}
