use hermas_core::inventory::SESSION_STATUS_ACTIVE;
use hermas_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A stock-take period, e.g. `2025-09`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InventorySession {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InventorySession {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case(SESSION_STATUS_ACTIVE)
    }
}
