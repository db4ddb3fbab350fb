//! Repository for the `entries` table.

use hermas_core::entry::EntryType;
use hermas_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::entry::{CreateEntry, Entry, UpdateEntry};

/// Entry columns; expects the joins in [`FROM`].
const COLUMNS: &str = "e.id, e.session_id, e.item_id, i.name AS item_name, e.category_id, e.type, \
                        e.unit, e.qty::FLOAT8 AS qty, e.warehouse_id, w.name AS warehouse_name, \
                        e.batch, e.mfg, e.exp, e.price_at_entry::FLOAT8 AS price_at_entry, \
                        e.user_id, u.username, (e.created_at AT TIME ZONE 'UTC')::DATE AS entry_date, \
                        e.created_at, e.updated_at";

const FROM: &str = "entries e
                    JOIN items i ON i.id = e.item_id
                    JOIN warehouses w ON w.id = e.warehouse_id
                    JOIN users u ON u.id = e.user_id";

pub struct EntryRepo;

impl EntryRepo {
    /// List entries newest first.
    ///
    /// `owner` restricts the list to one author; `None` returns every author's rows.
    pub async fn list(
        pool: &PgPool,
        owner: Option<DbId>,
        entry_type: Option<EntryType>,
    ) -> Result<Vec<Entry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE ($1::BIGINT IS NULL OR e.user_id = $1)
               AND ($2::TEXT IS NULL OR e.type = $2)
             ORDER BY e.created_at DESC, e.id DESC"
        );
        sqlx::query_as::<_, Entry>(&query)
            .bind(owner)
            .bind(entry_type.map(EntryType::as_str))
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Entry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE e.id = $1");
        sqlx::query_as::<_, Entry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several entries by ID. Missing IDs are simply absent from the result.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Entry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE e.id = ANY($1)");
        sqlx::query_as::<_, Entry>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Insert an entry authored by `user_id` with the given business timestamp.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEntry,
        user_id: DbId,
        created_at: Timestamp,
    ) -> Result<Entry, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO entries (session_id, item_id, category_id, type, unit, qty, warehouse_id,
                                  batch, mfg, exp, price_at_entry, user_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6::NUMERIC, $7, $8, $9, $10, $11::NUMERIC, $12, $13)
             RETURNING id",
        )
        .bind(input.session_id)
        .bind(input.item_id)
        .bind(input.category_id)
        .bind(input.entry_type.as_str())
        .bind(&input.unit)
        .bind(input.qty)
        .bind(input.warehouse_id)
        .bind(&input.batch)
        .bind(&input.mfg)
        .bind(&input.exp)
        .bind(input.price_at_entry)
        .bind(user_id)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Update an entry. Only non-`None` fields are applied; `created_at`
    /// moves only when a new timestamp is supplied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEntry,
        created_at: Option<Timestamp>,
    ) -> Result<Option<Entry>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE entries SET
                qty = COALESCE($2::NUMERIC, qty),
                warehouse_id = COALESCE($3, warehouse_id),
                batch = COALESCE($4, batch),
                price_at_entry = COALESCE($5::NUMERIC, price_at_entry),
                mfg = COALESCE($6, mfg),
                exp = COALESCE($7, exp),
                created_at = COALESCE($8, created_at)
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.qty)
        .bind(input.warehouse_id)
        .bind(&input.batch)
        .bind(input.price_at_entry)
        .bind(&input.mfg)
        .bind(&input.exp)
        .bind(created_at)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every listed entry in one transaction. Returns the number removed.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut removed = 0;
        for id in ids {
            removed += sqlx::query("DELETE FROM entries WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(removed)
    }
}
