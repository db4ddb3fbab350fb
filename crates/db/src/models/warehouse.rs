//! Storage locations. The UI calls them "locations".

use hermas_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `warehouses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Warehouse {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouse {
    pub name: String,
}
