//! Handlers for the dashboard views and their `.xlsx` exports.
//!
//! Every view is filtered by the caller's dashboard visibility: admins and
//! everyone under an `org` dashboard broadcast see all authors, the rest
//! see only their own entries.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use hermas_core::rbac::Permission;
use hermas_core::types::DbId;
use hermas_core::visibility::dashboard_visibility;
use hermas_db::models::dashboard::{
    DashboardDetail, DashboardSummary, DetailItem, DetailParams, ExportMode, ExportParams,
};
use hermas_db::repositories::{DashboardRepo, InventorySessionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEntriesExport;
use crate::spreadsheet::export::{
    detail_workbook, master_items_workbook, valued_workbook, ExportFile,
};
use crate::spreadsheet::XLSX_CONTENT_TYPE;
use crate::state::AppState;

/// GET /api/v1/dashboard/summary
pub async fn summary(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DashboardSummary>> {
    let owner = dashboard_visibility(user.viewer(), &user.broadcast).owner_filter();

    let cards = DashboardRepo::cards(&state.pool, owner).await?;
    let table = DashboardRepo::table(&state.pool, owner).await?;
    Ok(Json(DashboardSummary { cards, table }))
}

/// GET /api/v1/dashboard/detail?item_id=&limit=&offset=
pub async fn detail(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DetailParams>,
) -> AppResult<Json<DashboardDetail>> {
    let owner = dashboard_visibility(user.viewer(), &user.broadcast).owner_filter();
    let item = find_item(&state, params.item_id).await?;
    let (limit, offset) = params.window();

    let totals = DashboardRepo::item_totals(&state.pool, item.item_id, owner).await?;
    let entries =
        DashboardRepo::item_lines_page(&state.pool, item.item_id, owner, limit, offset).await?;
    let total = totals.entries_logged;

    Ok(Json(DashboardDetail {
        item,
        entries,
        total,
        limit,
        offset,
        has_next: offset.saturating_add(limit) < total,
    }))
}

/// GET /api/v1/dashboard/detail/{item_id}/export
pub async fn export_detail(
    RequireEntriesExport(user): RequireEntriesExport,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<Response> {
    let owner = dashboard_visibility(user.viewer(), &user.broadcast).owner_filter();
    let item = find_item(&state, item_id).await?;

    let totals = DashboardRepo::item_totals(&state.pool, item_id, owner).await?;
    let lines = DashboardRepo::item_lines(&state.pool, item_id, owner).await?;

    let file = detail_workbook(&item, &totals, &lines, Utc::now())
        .map_err(|e| AppError::InternalError(format!("Failed to build workbook: {e}")))?;
    tracing::info!(item_id, user_id = user.user_id, "Item detail exported");
    attachment(file)
}

/// GET /api/v1/dashboard/export?mode=with-master|valuated
///
/// Entries are limited to the active inventory sessions when any exist.
pub async fn export(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> AppResult<Response> {
    match params.mode {
        ExportMode::WithMaster => user.require(Permission::ExportDashboardSummary)?,
        ExportMode::Valuated => user.require(Permission::ExportDashboardEntries)?,
    }

    let owner = dashboard_visibility(user.viewer(), &user.broadcast).owner_filter();
    let active = InventorySessionRepo::active_ids(&state.pool).await?;
    let sessions = (!active.is_empty()).then_some(active.as_slice());

    let items = DashboardRepo::export_items(&state.pool, owner, sessions).await?;
    let now = Utc::now();
    let file = match params.mode {
        ExportMode::WithMaster => master_items_workbook(&items, now),
        ExportMode::Valuated => {
            let lines = DashboardRepo::export_lines(&state.pool, owner, sessions).await?;
            valued_workbook(&items, &lines, now)
        }
    }
    .map_err(|e| AppError::InternalError(format!("Failed to build workbook: {e}")))?;

    tracing::info!(
        mode = ?params.mode,
        user_id = user.user_id,
        filename = %file.filename,
        "Dashboard exported"
    );
    attachment(file)
}

async fn find_item(state: &AppState, item_id: DbId) -> AppResult<DetailItem> {
    DashboardRepo::detail_item(&state.pool, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Item", item_id))
}

fn attachment(file: ExportFile) -> AppResult<Response> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        file.filename
    ))
    .map_err(|e| AppError::InternalError(format!("Invalid export filename: {e}")))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
