//! Repository for the `warehouses` table.

use hermas_core::types::DbId;
use sqlx::PgPool;

use crate::models::warehouse::Warehouse;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct WarehouseRepo;

impl WarehouseRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Warehouse>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM warehouses ORDER BY name");
        sqlx::query_as::<_, Warehouse>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Warehouse>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM warehouses WHERE id = $1");
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, name: &str) -> Result<Warehouse, sqlx::Error> {
        let query = format!("INSERT INTO warehouses (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn count_entries(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE warehouse_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
