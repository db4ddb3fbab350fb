//! Repository for the `items` table, including the spreadsheet import.

use hermas_core::import::ImportRow;
use hermas_core::types::DbId;
use sqlx::PgPool;

use crate::models::item::{CreateItem, Item, UpdateItem};
use crate::repositories::CategoryRepo;

/// Item columns; expects `items i LEFT JOIN categories c LEFT JOIN category_groups g`.
const COLUMNS: &str = "i.id, i.name, i.unit, i.price::FLOAT8 AS price, i.category_id, \
                        c.name AS category_name, g.name AS group_name, i.created_at, i.updated_at";

const FROM: &str = "items i
                    LEFT JOIN categories c ON c.id = i.category_id
                    LEFT JOIN category_groups g ON g.id = c.group_id";

/// Rows created and updated by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub created: usize,
    pub updated: usize,
}

/// Error raised while applying an import inside its transaction.
#[derive(Debug)]
pub enum ImportError {
    /// A row names a group that is not in the database.
    UnknownGroup(String),
    Database(sqlx::Error),
}

impl From<sqlx::Error> for ImportError {
    fn from(err: sqlx::Error) -> Self {
        ImportError::Database(err)
    }
}

pub struct ItemRepo;

impl ItemRepo {
    /// List items by name, optionally filtered by a case-insensitive substring.
    pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<Item>, sqlx::Error> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()));
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE ($1::TEXT IS NULL OR LOWER(i.name) LIKE $1)
             ORDER BY i.name"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE i.id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateItem) -> Result<Item, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO items (name, unit, price, category_id)
             VALUES ($1, $2, $3::NUMERIC, $4)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.price)
        .bind(input.category_id)
        .fetch_one(pool)
        .await?;
        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Update an item. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateItem,
    ) -> Result<Option<Item>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE items SET
                name = COALESCE($2, name),
                unit = COALESCE($3, unit),
                price = COALESCE($4::NUMERIC, price),
                category_id = COALESCE($5, category_id)
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.price)
        .bind(input.category_id)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    pub async fn count_entries(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE item_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Upsert planned import rows in a single transaction.
    ///
    /// Sub-categories are created on demand within their group. Items are
    /// matched by name ignoring case; matches get their unit, price and
    /// category overwritten.
    pub async fn apply_import(
        pool: &PgPool,
        rows: &[ImportRow],
    ) -> Result<ImportCounts, ImportError> {
        let mut tx = pool.begin().await?;
        let mut counts = ImportCounts::default();

        for row in rows {
            let group = CategoryRepo::find_group_by_name(&mut *tx, &row.group_name)
                .await?
                .ok_or_else(|| ImportError::UnknownGroup(row.group_name.clone()))?;

            let category_id = match &row.sub_category {
                Some(name) => {
                    Some(CategoryRepo::find_or_create_in_group(&mut *tx, group.id, name).await?)
                }
                None => None,
            };

            let existing: Option<DbId> =
                sqlx::query_scalar("SELECT id FROM items WHERE LOWER(name) = LOWER($1)")
                    .bind(&row.item_name)
                    .fetch_optional(&mut *tx)
                    .await?;

            match existing {
                Some(id) => {
                    sqlx::query(
                        "UPDATE items SET unit = $2, price = $3::NUMERIC, category_id = $4
                         WHERE id = $1",
                    )
                    .bind(id)
                    .bind(&row.unit)
                    .bind(row.price)
                    .bind(category_id)
                    .execute(&mut *tx)
                    .await?;
                    counts.updated += 1;
                }
                None => {
                    sqlx::query(
                        "INSERT INTO items (name, unit, price, category_id)
                         VALUES ($1, $2, $3::NUMERIC, $4)",
                    )
                    .bind(&row.item_name)
                    .bind(&row.unit)
                    .bind(row.price)
                    .bind(category_id)
                    .execute(&mut *tx)
                    .await?;
                    counts.created += 1;
                }
            }
        }

        tx.commit().await?;
        Ok(counts)
    }
}
