//! Repository for `category_groups` and `categories` (sub-categories).

use hermas_core::inventory::CORE_INVENTORY_GROUPS;
use hermas_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::category::{Category, CategoryGroup};

const GROUP_COLUMNS: &str = "id, name, created_at, updated_at";

/// Sub-category columns; expects `categories c JOIN category_groups g`.
const COLUMNS: &str = "c.id, c.name, c.group_id, g.name AS group_name, c.created_at, c.updated_at";

pub struct CategoryRepo;

impl CategoryRepo {
    /* ---- groups ---- */

    /// The official groups, in their fixed display order.
    pub async fn list_core_groups(pool: &PgPool) -> Result<Vec<CategoryGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {GROUP_COLUMNS} FROM category_groups
             WHERE name = ANY($1)
             ORDER BY array_position($1, name)"
        );
        sqlx::query_as::<_, CategoryGroup>(&query)
            .bind(&CORE_INVENTORY_GROUPS[..])
            .fetch_all(pool)
            .await
    }

    pub async fn find_group(pool: &PgPool, id: DbId) -> Result<Option<CategoryGroup>, sqlx::Error> {
        let query = format!("SELECT {GROUP_COLUMNS} FROM category_groups WHERE id = $1");
        sqlx::query_as::<_, CategoryGroup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look a group up by name, ignoring case.
    pub async fn find_group_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<CategoryGroup>, sqlx::Error> {
        let query =
            format!("SELECT {GROUP_COLUMNS} FROM category_groups WHERE LOWER(name) = LOWER($1)");
        sqlx::query_as::<_, CategoryGroup>(&query)
            .bind(name)
            .fetch_optional(conn)
            .await
    }

    /// Insert a group unless it already exists.
    pub async fn ensure_group(pool: &PgPool, name: &str) -> Result<CategoryGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO category_groups (name) VALUES ($1)
             ON CONFLICT ON CONSTRAINT uq_category_groups_name DO UPDATE SET name = EXCLUDED.name
             RETURNING {GROUP_COLUMNS}"
        );
        sqlx::query_as::<_, CategoryGroup>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /* ---- sub-categories ---- */

    /// List sub-categories by name, optionally within one group.
    pub async fn list(pool: &PgPool, group_id: Option<DbId>) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories c
             JOIN category_groups g ON g.id = c.group_id
             WHERE ($1::BIGINT IS NULL OR c.group_id = $1)
             ORDER BY c.name"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories c
             JOIN category_groups g ON g.id = c.group_id
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another sub-category in the group already uses the name.
    pub async fn name_taken(
        pool: &PgPool,
        group_id: DbId,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM categories
                WHERE group_id = $1 AND LOWER(name) = LOWER($2)
                  AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(group_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    pub async fn create(pool: &PgPool, name: &str, group_id: DbId) -> Result<Category, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO categories (name, group_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(group_id)
        .fetch_one(pool)
        .await?;
        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Rename or move a sub-category. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: &str,
        group_id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let updated = sqlx::query("UPDATE categories SET name = $2, group_id = $3 WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(group_id)
            .execute(pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Find a sub-category inside a group by name, creating it if missing.
    pub async fn find_or_create_in_group(
        conn: &mut PgConnection,
        group_id: DbId,
        name: &str,
    ) -> Result<DbId, sqlx::Error> {
        let existing: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE group_id = $1 AND LOWER(name) = LOWER($2)",
        )
        .bind(group_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
        if let Some(id) = existing {
            return Ok(id);
        }
        sqlx::query_scalar("INSERT INTO categories (name, group_id) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(group_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Item and entry references to a sub-category, as `(items, entries)`.
    pub async fn usage(pool: &PgPool, id: DbId) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM items WHERE category_id = $1),
                (SELECT COUNT(*) FROM entries WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
