//! Read models for the dashboard summary, item detail and exports.

use hermas_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default page size for the item detail view.
pub const DEFAULT_DETAIL_LIMIT: i64 = 50;

/// Upper bound on the item detail page size.
pub const MAX_DETAIL_LIMIT: i64 = 500;

/// One card per category group.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardCard {
    pub group_id: DbId,
    pub group_name: String,
    /// Number of sub-categories in the group.
    pub categories: i64,
    pub items: i64,
    /// Distinct items with at least one visible entry.
    pub counted: i64,
    pub total_value: f64,
}

/// One row per item that has visible entries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardTableRow {
    pub item_id: DbId,
    pub item_name: String,
    pub unit: String,
    pub category_name: Option<String>,
    pub batches: i64,
    pub entries_logged: i64,
    pub total_qty: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub cards: Vec<DashboardCard>,
    pub table: Vec<DashboardTableRow>,
}

/// Header of the item detail view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DetailItem {
    pub item_id: DbId,
    pub item_name: String,
    pub unit: String,
    pub category_name: Option<String>,
}

/// A single entry line as shown in the detail modal and the exports.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EntryLine {
    pub entry_id: DbId,
    pub item_id: DbId,
    pub username: String,
    pub item_name: String,
    pub category_name: Option<String>,
    pub unit: String,
    pub batch: Option<String>,
    pub mfg: Option<String>,
    pub exp: Option<String>,
    pub qty: f64,
    pub location: String,
    /// Price at entry, falling back to the item price.
    pub price: Option<f64>,
    pub line_value: f64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardDetail {
    pub item: DetailItem,
    pub entries: Vec<EntryLine>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_next: bool,
}

/// Aggregate totals for one item.
#[derive(Debug, Clone, Default, FromRow)]
pub struct ItemTotals {
    pub batches: i64,
    pub entries_logged: i64,
    pub total_qty: f64,
    pub total_value: f64,
}

/// An item-master row with its (optional) entry aggregates, for exports.
#[derive(Debug, Clone, FromRow)]
pub struct ExportItemRow {
    pub item_id: DbId,
    pub item_name: String,
    pub unit: String,
    pub category_name: Option<String>,
    pub group_name: Option<String>,
    pub batches: Option<i64>,
    pub entries_logged: Option<i64>,
    pub total_qty: Option<f64>,
    pub total_value: Option<f64>,
}

impl ExportItemRow {
    pub fn has_entries(&self) -> bool {
        self.entries_logged.is_some()
    }
}

/// Query string for `GET /dashboard/detail`.
#[derive(Debug, Deserialize)]
pub struct DetailParams {
    pub item_id: DbId,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl DetailParams {
    /// Clamp the page window to sane bounds.
    pub fn window(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_DETAIL_LIMIT)
            .clamp(1, MAX_DETAIL_LIMIT);
        let offset = self
            .offset
            .unwrap_or(0)
            .clamp(0, i64::MAX - MAX_DETAIL_LIMIT);
        (limit, offset)
    }
}

/// Which dashboard workbook to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportMode {
    WithMaster,
    #[default]
    Valuated,
}

/// Query string for `GET /dashboard/export`.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub mode: ExportMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_window_defaults_and_clamps() {
        let params = DetailParams {
            item_id: 1,
            limit: None,
            offset: None,
        };
        assert_eq!(params.window(), (DEFAULT_DETAIL_LIMIT, 0));

        let params = DetailParams {
            item_id: 1,
            limit: Some(10_000),
            offset: Some(-4),
        };
        assert_eq!(params.window(), (MAX_DETAIL_LIMIT, 0));
    }

    #[test]
    fn detail_window_caps_huge_offsets() {
        let params = DetailParams {
            item_id: 1,
            limit: Some(MAX_DETAIL_LIMIT),
            offset: Some(i64::MAX),
        };
        let (limit, offset) = params.window();
        assert!(offset.checked_add(limit).is_some());
    }

    #[test]
    fn export_mode_parses_kebab_case() {
        let params: ExportParams = serde_json::from_str(r#"{"mode":"with-master"}"#).unwrap();
        assert_eq!(params.mode, ExportMode::WithMaster);
        let params: ExportParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.mode, ExportMode::Valuated);
    }
}
