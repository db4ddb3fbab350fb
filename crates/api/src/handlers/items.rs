//! Handlers for the item master (`/items`), including the spreadsheet import.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hermas_core::import::{plan_item_import, ImportSummary};
use hermas_core::types::DbId;
use hermas_db::models::item::{CreateItem, Item, ItemListParams, UpdateItem};
use hermas_db::repositories::item_repo::ImportError;
use hermas_db::repositories::{CategoryRepo, ItemRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireImportMasterData, RequireItemDelete};
use crate::spreadsheet::reader::{read_first_sheet, INVALID_WORKBOOK_MESSAGE};
use crate::state::AppState;

/// GET /api/v1/items?q=
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ItemListParams>,
) -> AppResult<Json<Vec<Item>>> {
    let items = ItemRepo::list(&state.pool, params.q.as_deref()).await?;
    Ok(Json(items))
}

/// POST /api/v1/items
pub async fn create(
    RequireImportMasterData(user): RequireImportMasterData,
    State(state): State<AppState>,
    Json(input): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let input = input.normalized()?;
    ensure_category(&state, input.category_id).await?;

    let item = ItemRepo::create(&state.pool, &input).await?;
    tracing::info!(item_id = item.id, actor = user.user_id, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/v1/items/{id}
pub async fn update(
    RequireImportMasterData(user): RequireImportMasterData,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    let input = input.normalized()?;
    ensure_category(&state, input.category_id).await?;

    let item = ItemRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Item", id))?;
    tracing::info!(item_id = id, actor = user.user_id, "Item updated");
    Ok(Json(item))
}

/// DELETE /api/v1/items/{id}
pub async fn delete(
    RequireItemDelete(user): RequireItemDelete,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Item", id))?;

    if ItemRepo::count_entries(&state.pool, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete an item that has inventory entries.".into(),
        ));
    }

    ItemRepo::delete(&state.pool, id).await?;
    tracing::info!(item_id = id, actor = user.user_id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/items/import
///
/// Accepts a multipart upload with a single `.xlsx` file and upserts the
/// item master from its first sheet in one transaction.
pub async fn import(
    RequireImportMasterData(user): RequireImportMasterData,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ImportSummary>> {
    let (filename, bytes) = read_upload(&mut multipart).await?;

    let rows = read_first_sheet(&bytes)?;
    let plan = plan_item_import(&rows)?;

    let counts = ItemRepo::apply_import(&state.pool, &plan.rows)
        .await
        .map_err(|err| match err {
            ImportError::UnknownGroup(group) => {
                AppError::BadRequest(format!("Unknown inventory group: {group}"))
            }
            ImportError::Database(err) => AppError::Database(err),
        })?;

    tracing::info!(
        actor = user.user_id,
        filename = %filename,
        created = counts.created,
        updated = counts.updated,
        skipped = plan.skipped,
        "Item master imported"
    );

    Ok(Json(ImportSummary {
        filename,
        created: counts.created,
        updated: counts.updated,
        skipped: plan.skipped,
    }))
}

/// First file part of the upload, which must be an `.xlsx` workbook.
async fn read_upload(multipart: &mut Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if !filename.to_lowercase().ends_with(".xlsx") {
            return Err(AppError::BadRequest(INVALID_WORKBOOK_MESSAGE.into()));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(AppError::BadRequest("No file uploaded".into()))
}

async fn ensure_category(state: &AppState, category_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = category_id {
        CategoryRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Category not found".into()))?;
    }
    Ok(())
}
