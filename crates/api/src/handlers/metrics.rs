//! Handlers for units of measure (`/metrics`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hermas_core::inventory::normalize_name;
use hermas_core::types::DbId;
use hermas_db::models::metric::{CreateMetric, Metric};
use hermas_db::repositories::MetricRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditManageData;
use crate::state::AppState;

/// GET /api/v1/metrics
pub async fn list(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Metric>>> {
    let metrics = MetricRepo::list(&state.pool).await?;
    Ok(Json(metrics))
}

/// POST /api/v1/metrics
pub async fn create(
    RequireEditManageData(user): RequireEditManageData,
    State(state): State<AppState>,
    Json(input): Json<CreateMetric>,
) -> AppResult<(StatusCode, Json<Metric>)> {
    let name = normalize_name(&input.name, "Unit name")?;
    let metric = MetricRepo::create(&state.pool, &name).await?;
    tracing::info!(metric_id = metric.id, actor = user.user_id, "Unit created");
    Ok((StatusCode::CREATED, Json(metric)))
}

/// DELETE /api/v1/metrics/{id}
///
/// Blocked while any item or entry uses the unit.
pub async fn delete(
    RequireEditManageData(user): RequireEditManageData,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let metric = MetricRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Unit", id))?;

    if MetricRepo::in_use(&state.pool, &metric.name).await? {
        return Err(AppError::BadRequest(
            "Cannot delete a unit that is in use.".into(),
        ));
    }

    MetricRepo::delete(&state.pool, id).await?;
    tracing::info!(metric_id = id, actor = user.user_id, "Unit deleted");
    Ok(StatusCode::NO_CONTENT)
}
