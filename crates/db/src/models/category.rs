//! Category groups and sub-categories.

use hermas_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `category_groups`. Only the official groups are ever listed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryGroup {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A sub-category with its group name resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub group_id: DbId,
    pub group_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /categories/subs`.
#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub group_id: DbId,
}

/// DTO for `PUT /categories/subs/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub group_id: Option<DbId>,
}

/// Query string for `GET /categories/subs`.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryListParams {
    pub group_id: Option<DbId>,
}
