//! Repository for the `inventory_sessions` table.

use hermas_core::inventory::SESSION_STATUS_ACTIVE;
use hermas_core::types::DbId;
use sqlx::PgPool;

use crate::models::inventory_session::InventorySession;

const COLUMNS: &str = "id, code, name, status, created_at, updated_at";

pub struct InventorySessionRepo;

impl InventorySessionRepo {
    /// All sessions, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<InventorySession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inventory_sessions ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, InventorySession>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InventorySession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inventory_sessions WHERE id = $1");
        sqlx::query_as::<_, InventorySession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// IDs of sessions whose status is `active`.
    pub async fn active_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM inventory_sessions WHERE status = $1 ORDER BY id")
            .bind(SESSION_STATUS_ACTIVE)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM inventory_sessions")
            .fetch_one(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        code: &str,
        name: &str,
        status: &str,
    ) -> Result<InventorySession, sqlx::Error> {
        let query = format!(
            "INSERT INTO inventory_sessions (code, name, status) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InventorySession>(&query)
            .bind(code)
            .bind(name)
            .bind(status)
            .fetch_one(pool)
            .await
    }
}
