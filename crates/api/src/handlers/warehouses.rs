//! Handlers for storage locations (`/warehouses`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hermas_core::inventory::normalize_name;
use hermas_core::types::DbId;
use hermas_db::models::warehouse::{CreateWarehouse, Warehouse};
use hermas_db::repositories::WarehouseRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditManageData;
use crate::state::AppState;

/// GET /api/v1/warehouses
pub async fn list(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Warehouse>>> {
    let warehouses = WarehouseRepo::list(&state.pool).await?;
    Ok(Json(warehouses))
}

/// POST /api/v1/warehouses
pub async fn create(
    RequireEditManageData(user): RequireEditManageData,
    State(state): State<AppState>,
    Json(input): Json<CreateWarehouse>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let name = normalize_name(&input.name, "Location name")?;
    let warehouse = WarehouseRepo::create(&state.pool, &name).await?;
    tracing::info!(warehouse_id = warehouse.id, actor = user.user_id, "Location created");
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// DELETE /api/v1/warehouses/{id}
pub async fn delete(
    RequireEditManageData(user): RequireEditManageData,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    WarehouseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Location", id))?;

    if WarehouseRepo::count_entries(&state.pool, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a location that has inventory entries.".into(),
        ));
    }

    WarehouseRepo::delete(&state.pool, id).await?;
    tracing::info!(warehouse_id = id, actor = user.user_id, "Location deleted");
    Ok(StatusCode::NO_CONTENT)
}
