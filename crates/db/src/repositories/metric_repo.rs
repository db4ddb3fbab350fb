//! Repository for the `metrics` table (units of measure).

use hermas_core::types::DbId;
use sqlx::PgPool;

use crate::models::metric::Metric;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct MetricRepo;

impl MetricRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Metric>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM metrics ORDER BY name");
        sqlx::query_as::<_, Metric>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Metric>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM metrics WHERE id = $1");
        sqlx::query_as::<_, Metric>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, name: &str) -> Result<Metric, sqlx::Error> {
        let query = format!("INSERT INTO metrics (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Metric>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Insert the unit unless one with the same name (any case) exists.
    pub async fn ensure(pool: &PgPool, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO metrics (name) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Whether any item or entry uses the unit (case-insensitive).
    pub async fn in_use(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM items WHERE LOWER(unit) = LOWER($1))
                 OR EXISTS (SELECT 1 FROM entries WHERE LOWER(unit) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM metrics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
