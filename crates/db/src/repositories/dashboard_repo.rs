//! Aggregate queries behind the dashboard and its spreadsheet exports.
//!
//! Every query takes an `owner` filter: `Some(user_id)` limits the
//! aggregates to that user's entries, `None` covers every author.

use hermas_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{
    DashboardCard, DashboardTableRow, DetailItem, EntryLine, ExportItemRow, ItemTotals,
};

/// Value of one entry line: quantity times the entry price, the item price, or zero.
const LINE_VALUE: &str = "e.qty * COALESCE(e.price_at_entry, i.price, 0)";

/// Entry line columns; expects the joins in [`LINE_FROM`].
const LINE_COLUMNS: &str = "e.id AS entry_id, e.item_id, u.username, i.name AS item_name, \
                             COALESCE(ec.name, ic.name) AS category_name, i.unit, e.batch, \
                             e.mfg, e.exp, e.qty::FLOAT8 AS qty, w.name AS location, \
                             COALESCE(e.price_at_entry, i.price)::FLOAT8 AS price, \
                             (e.qty * COALESCE(e.price_at_entry, i.price, 0))::FLOAT8 AS line_value, \
                             e.created_at";

const LINE_FROM: &str = "entries e
                         JOIN users u ON u.id = e.user_id
                         JOIN items i ON i.id = e.item_id
                         JOIN warehouses w ON w.id = e.warehouse_id
                         LEFT JOIN categories ec ON ec.id = e.category_id
                         LEFT JOIN categories ic ON ic.id = i.category_id";

pub struct DashboardRepo;

impl DashboardRepo {
    /// One card per category group, ordered by group name.
    pub async fn cards(pool: &PgPool, owner: Option<DbId>) -> Result<Vec<DashboardCard>, sqlx::Error> {
        let query = format!(
            "SELECT g.id AS group_id, g.name AS group_name,
                    COUNT(DISTINCT c.id) AS categories,
                    COUNT(DISTINCT i.id) AS items,
                    COUNT(DISTINCT e.item_id) AS counted,
                    COALESCE(SUM({LINE_VALUE}), 0)::FLOAT8 AS total_value
             FROM category_groups g
             LEFT JOIN categories c ON c.group_id = g.id
             LEFT JOIN items i ON i.category_id = c.id
             LEFT JOIN entries e ON e.item_id = i.id AND ($1::BIGINT IS NULL OR e.user_id = $1)
             GROUP BY g.id, g.name
             ORDER BY g.name"
        );
        sqlx::query_as::<_, DashboardCard>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await
    }

    /// Per-item totals for items with visible entries, ordered by item name.
    pub async fn table(
        pool: &PgPool,
        owner: Option<DbId>,
    ) -> Result<Vec<DashboardTableRow>, sqlx::Error> {
        let query = format!(
            "SELECT e.item_id, i.name AS item_name, i.unit, c.name AS category_name,
                    COUNT(DISTINCT e.batch) AS batches,
                    COUNT(e.id) AS entries_logged,
                    COALESCE(SUM(e.qty), 0)::FLOAT8 AS total_qty,
                    COALESCE(SUM({LINE_VALUE}), 0)::FLOAT8 AS total_value
             FROM entries e
             JOIN items i ON i.id = e.item_id
             LEFT JOIN categories c ON c.id = e.category_id
             WHERE ($1::BIGINT IS NULL OR e.user_id = $1)
             GROUP BY e.item_id, i.name, i.unit, c.name
             ORDER BY i.name"
        );
        sqlx::query_as::<_, DashboardTableRow>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await
    }

    /// Item header for the detail view and the per-item export.
    pub async fn detail_item(pool: &PgPool, item_id: DbId) -> Result<Option<DetailItem>, sqlx::Error> {
        sqlx::query_as::<_, DetailItem>(
            "SELECT i.id AS item_id, i.name AS item_name, i.unit, c.name AS category_name
             FROM items i
             LEFT JOIN categories c ON c.id = i.category_id
             WHERE i.id = $1",
        )
        .bind(item_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn item_totals(
        pool: &PgPool,
        item_id: DbId,
        owner: Option<DbId>,
    ) -> Result<ItemTotals, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(DISTINCT e.batch) AS batches,
                    COUNT(e.id) AS entries_logged,
                    COALESCE(SUM(e.qty), 0)::FLOAT8 AS total_qty,
                    COALESCE(SUM({LINE_VALUE}), 0)::FLOAT8 AS total_value
             FROM entries e
             JOIN items i ON i.id = e.item_id
             WHERE e.item_id = $1 AND ($2::BIGINT IS NULL OR e.user_id = $2)"
        );
        sqlx::query_as::<_, ItemTotals>(&query)
            .bind(item_id)
            .bind(owner)
            .fetch_one(pool)
            .await
    }

    /// Newest-first page of an item's entry lines.
    pub async fn item_lines_page(
        pool: &PgPool,
        item_id: DbId,
        owner: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EntryLine>, sqlx::Error> {
        let query = format!(
            "SELECT {LINE_COLUMNS} FROM {LINE_FROM}
             WHERE e.item_id = $1 AND ($2::BIGINT IS NULL OR e.user_id = $2)
             ORDER BY e.created_at DESC, e.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, EntryLine>(&query)
            .bind(item_id)
            .bind(owner)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every entry line of an item, oldest first.
    pub async fn item_lines(
        pool: &PgPool,
        item_id: DbId,
        owner: Option<DbId>,
    ) -> Result<Vec<EntryLine>, sqlx::Error> {
        let query = format!(
            "SELECT {LINE_COLUMNS} FROM {LINE_FROM}
             WHERE e.item_id = $1 AND ($2::BIGINT IS NULL OR e.user_id = $2)
             ORDER BY e.created_at, e.id"
        );
        sqlx::query_as::<_, EntryLine>(&query)
            .bind(item_id)
            .bind(owner)
            .fetch_all(pool)
            .await
    }

    /// All visible entry lines, by item name then time.
    ///
    /// `session_ids` restricts the lines to those inventory sessions.
    pub async fn export_lines(
        pool: &PgPool,
        owner: Option<DbId>,
        session_ids: Option<&[DbId]>,
    ) -> Result<Vec<EntryLine>, sqlx::Error> {
        let query = format!(
            "SELECT {LINE_COLUMNS} FROM {LINE_FROM}
             WHERE ($1::BIGINT IS NULL OR e.user_id = $1)
               AND ($2::BIGINT[] IS NULL OR e.session_id = ANY($2))
             ORDER BY i.name, e.created_at, e.id"
        );
        sqlx::query_as::<_, EntryLine>(&query)
            .bind(owner)
            .bind(session_ids)
            .fetch_all(pool)
            .await
    }

    /// Every item with its entry aggregates; items with entries come first,
    /// then alphabetical (case-insensitive).
    pub async fn export_items(
        pool: &PgPool,
        owner: Option<DbId>,
        session_ids: Option<&[DbId]>,
    ) -> Result<Vec<ExportItemRow>, sqlx::Error> {
        let query = format!(
            "WITH agg AS (
                SELECT e.item_id,
                       COUNT(DISTINCT e.batch) AS batches,
                       COUNT(e.id) AS entries_logged,
                       SUM(e.qty)::FLOAT8 AS total_qty,
                       SUM({LINE_VALUE})::FLOAT8 AS total_value
                FROM entries e
                JOIN items i ON i.id = e.item_id
                WHERE ($1::BIGINT IS NULL OR e.user_id = $1)
                  AND ($2::BIGINT[] IS NULL OR e.session_id = ANY($2))
                GROUP BY e.item_id
             )
             SELECT i.id AS item_id, i.name AS item_name, i.unit,
                    c.name AS category_name, g.name AS group_name,
                    agg.batches, agg.entries_logged, agg.total_qty, agg.total_value
             FROM items i
             LEFT JOIN categories c ON c.id = i.category_id
             LEFT JOIN category_groups g ON g.id = c.group_id
             LEFT JOIN agg ON agg.item_id = i.id
             ORDER BY (agg.entries_logged IS NULL), LOWER(i.name)"
        );
        sqlx::query_as::<_, ExportItemRow>(&query)
            .bind(owner)
            .bind(session_ids)
            .fetch_all(pool)
            .await
    }
}
