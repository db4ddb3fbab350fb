//! Handlers for stock entries (`/entries`).
//!
//! Permissions depend on the entry type, so the checks live in the handlers
//! rather than in extractors. Non-admins only ever edit or delete their own
//! rows; what they can list follows the admin role's broadcast scopes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use hermas_core::entry::{dedupe_ids, entry_timestamp, move_to_date, EntryType};
use hermas_core::types::DbId;
use hermas_core::visibility::{entry_edit_visibility, entry_view_visibility};
use hermas_db::models::entry::{
    BulkDeleteEntries, CreateEntry, Entry, EntryListParams, UpdateEntry,
};
use hermas_db::repositories::{
    CategoryRepo, EntryRepo, InventorySessionRepo, ItemRepo, WarehouseRepo,
};
use hermas_events::EntryEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DeletedResponse;
use crate::state::AppState;

/// GET /api/v1/entries?type=raw|sfg|fg
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<EntryListParams>,
) -> AppResult<Json<Vec<Entry>>> {
    let entry_type = params
        .entry_type
        .as_deref()
        .map(EntryType::parse)
        .transpose()?;
    let visibility = entry_view_visibility(user.viewer(), &user.broadcast, entry_type);

    let entries = EntryRepo::list(&state.pool, visibility.owner_filter(), entry_type).await?;
    Ok(Json(entries))
}

/// POST /api/v1/entries
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEntry>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    user.require(input.entry_type.add_permission())?;
    let input = input.normalized()?;

    ItemRepo::find_by_id(&state.pool, input.item_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Item not found".into()))?;
    InventorySessionRepo::find_by_id(&state.pool, input.session_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Inventory session not found".into()))?;
    ensure_warehouse(&state, input.warehouse_id).await?;
    if let Some(category_id) = input.category_id {
        CategoryRepo::find_by_id(&state.pool, category_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Category not found".into()))?;
    }

    let created_at = entry_timestamp(input.entry_date, Utc::now());
    let entry = EntryRepo::create(&state.pool, &input, user.user_id, created_at).await?;

    tracing::info!(
        entry_id = entry.id,
        entry_type = %entry.entry_type,
        user_id = user.user_id,
        "Entry created"
    );
    state.event_bus.publish(EntryEvent::created(
        entry.id,
        entry.entry_type,
        user.user_id,
        payload(&entry),
    ));

    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/v1/entries/{id}
///
/// A new `entry_date` moves the entry to that day but keeps its time of day.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEntry>,
) -> AppResult<Json<Entry>> {
    let existing = find_entry(&state, id).await?;
    user.require(existing.entry_type.edit_permission())?;
    ensure_editable(&user, &existing)?;

    let input = input.normalized()?;
    if let Some(warehouse_id) = input.warehouse_id {
        ensure_warehouse(&state, warehouse_id).await?;
    }

    let created_at = input
        .entry_date
        .map(|date| move_to_date(existing.created_at, date));
    let entry = EntryRepo::update(&state.pool, id, &input, created_at)
        .await?
        .ok_or_else(|| AppError::not_found("Entry", id))?;

    tracing::info!(entry_id = id, user_id = user.user_id, "Entry updated");
    state.event_bus.publish(EntryEvent::updated(
        entry.id,
        entry.entry_type,
        user.user_id,
        payload(&entry),
    ));

    Ok(Json(entry))
}

/// DELETE /api/v1/entries/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_entry(&state, id).await?;
    ensure_editable(&user, &existing)?;
    user.require(existing.entry_type.bulk_permission())?;

    EntryRepo::delete(&state.pool, id).await?;

    tracing::info!(entry_id = id, user_id = user.user_id, "Entry deleted");
    state
        .event_bus
        .publish(EntryEvent::deleted(id, existing.entry_type, user.user_id));

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/entries/bulk-delete
///
/// Every id must exist and pass the single-delete checks before anything is
/// removed; the rows then go in one statement.
pub async fn bulk_delete(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteEntries>,
) -> AppResult<Json<DeletedResponse>> {
    let ids = dedupe_ids(&input.entry_ids);
    if ids.is_empty() {
        return Err(AppError::BadRequest("No entries selected".into()));
    }

    let found = EntryRepo::find_many(&state.pool, &ids).await?;
    let mut targets = Vec::with_capacity(ids.len());
    for id in &ids {
        let entry = found
            .iter()
            .find(|e| e.id == *id)
            .ok_or_else(|| AppError::not_found("Entry", *id))?;
        ensure_editable(&user, entry)?;
        user.require(entry.entry_type.bulk_permission())?;
        targets.push((entry.id, entry.entry_type));
    }

    let deleted = EntryRepo::delete_many(&state.pool, &ids).await?;

    tracing::info!(count = deleted, user_id = user.user_id, "Entries bulk deleted");
    for (id, entry_type) in targets {
        state
            .event_bus
            .publish(EntryEvent::deleted(id, entry_type, user.user_id));
    }

    Ok(Json(DeletedResponse { deleted }))
}

async fn find_entry(state: &AppState, id: DbId) -> AppResult<Entry> {
    EntryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Entry", id))
}

async fn ensure_warehouse(state: &AppState, warehouse_id: DbId) -> AppResult<()> {
    WarehouseRepo::find_by_id(&state.pool, warehouse_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Location not found".into()))?;
    Ok(())
}

fn ensure_editable(user: &AuthUser, entry: &Entry) -> AppResult<()> {
    if entry_edit_visibility(user.viewer()).allows(entry.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("Forbidden"))
    }
}

fn payload(entry: &Entry) -> serde_json::Value {
    serde_json::to_value(entry).unwrap_or_else(|_| serde_json::json!({ "id": entry.id }))
}
