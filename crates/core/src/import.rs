//! Pure planning logic for the item master spreadsheet import.
//!
//! The API layer reads the first worksheet into [`SheetCell`] rows and hands
//! them to [`plan_item_import`], which validates the header row, skips
//! unusable rows and de-duplicates items by name. Resolving groups and
//! upserting rows happens in the database layer.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::inventory::is_core_group;

// ── Constants ────────────────────────────────────────────────────────

pub const HEADER_ITEM_NAME: &str = "item name";
pub const HEADER_GROUP: &str = "group";
pub const HEADER_SUB_CATEGORY: &str = "sub category";
pub const HEADER_UNIT: &str = "unit";
pub const HEADER_PRICE: &str = "price";

/// Every header the first row must carry (compared case-insensitively).
pub const REQUIRED_HEADERS: [&str; 5] = [
    HEADER_ITEM_NAME,
    HEADER_GROUP,
    HEADER_SUB_CATEGORY,
    HEADER_UNIT,
    HEADER_PRICE,
];

pub const MISSING_HEADERS_MESSAGE: &str =
    "The first row must contain headers for Item Name, Group, Sub Category, Unit, and Price";

pub const NO_VALID_ROWS_MESSAGE: &str = "No valid rows found in the spreadsheet";

// ── Types ────────────────────────────────────────────────────────────

/// A spreadsheet cell reduced to what the importer cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Empty,
    Text(String),
    Number(f64),
}

impl SheetCell {
    /// Trimmed textual form; numbers print without a trailing `.0`.
    pub fn text(&self) -> String {
        match self {
            SheetCell::Empty => String::new(),
            SheetCell::Text(s) => s.trim().to_string(),
            SheetCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            SheetCell::Number(n) => n.to_string(),
        }
    }
}

/// One validated, de-duplicated item row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub item_name: String,
    pub group_name: String,
    pub sub_category: Option<String>,
    pub unit: String,
    pub price: Option<f64>,
}

/// Rows to apply plus the number of data rows that were skipped.
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub rows: Vec<ImportRow>,
    pub skipped: usize,
}

/// Counts returned to the client after the import commits.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub filename: String,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

// ── Pure functions ───────────────────────────────────────────────────

/// Parse a price cell. Blank is `Ok(None)`; garbage is an error.
///
/// Thousands separators are accepted and the value is rounded to 2 decimals.
pub fn parse_price(cell: &SheetCell) -> Result<Option<f64>, CoreError> {
    let value = match cell {
        SheetCell::Empty => return Ok(None),
        SheetCell::Number(n) => *n,
        SheetCell::Text(s) => {
            let cleaned = s.trim().replace(',', "");
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<f64>()
                .map_err(|_| CoreError::Validation("Price must be a valid number".to_string()))?
        }
    };
    if !value.is_finite() {
        return Err(CoreError::Validation(
            "Price must be a valid number".to_string(),
        ));
    }
    Ok(Some((value * 100.0).round() / 100.0))
}

/// Map each required header to its column index; first occurrence wins.
pub fn locate_headers(header_row: &[SheetCell]) -> Result<HashMap<&'static str, usize>, CoreError> {
    let mut columns: HashMap<&'static str, usize> = HashMap::new();
    for (idx, cell) in header_row.iter().enumerate() {
        let name = cell.text().to_lowercase();
        if let Some(header) = REQUIRED_HEADERS.iter().find(|h| **h == name) {
            columns.entry(header).or_insert(idx);
        }
    }
    if columns.len() != REQUIRED_HEADERS.len() {
        return Err(CoreError::Validation(MISSING_HEADERS_MESSAGE.to_string()));
    }
    Ok(columns)
}

/// Validate the sheet and build the list of rows to upsert.
///
/// Rows missing a name, group or unit (blank rows included), rows whose group is not an official
/// group (exact match) and rows with an unparseable price are skipped.
/// Later rows replace earlier rows with the same lower-cased name but keep
/// the earlier row's position.
pub fn plan_item_import(rows: &[Vec<SheetCell>]) -> Result<ImportPlan, CoreError> {
    let Some((header_row, data_rows)) = rows.split_first() else {
        return Err(CoreError::Validation("The workbook is empty".to_string()));
    };
    let columns = locate_headers(header_row)?;

    let cell = |row: &[SheetCell], header: &str| -> SheetCell {
        columns
            .get(header)
            .and_then(|idx| row.get(*idx))
            .cloned()
            .unwrap_or(SheetCell::Empty)
    };

    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, ImportRow> = HashMap::new();
    let mut skipped = 0;

    for row in data_rows {
        let item_name = cell(row, HEADER_ITEM_NAME).text();
        let group_name = cell(row, HEADER_GROUP).text();
        let unit = cell(row, HEADER_UNIT).text();
        let sub_category = cell(row, HEADER_SUB_CATEGORY).text();

        if item_name.is_empty() || group_name.is_empty() || unit.is_empty() {
            skipped += 1;
            continue;
        }
        if !is_core_group(&group_name) {
            skipped += 1;
            continue;
        }
        let Ok(price) = parse_price(&cell(row, HEADER_PRICE)) else {
            skipped += 1;
            continue;
        };

        let key = item_name.to_lowercase();
        if !by_key.contains_key(&key) {
            order.push(key.clone());
        }
        by_key.insert(
            key,
            ImportRow {
                item_name,
                group_name,
                sub_category: (!sub_category.is_empty()).then_some(sub_category),
                unit,
                price,
            },
        );
    }

    let rows: Vec<ImportRow> = order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect();

    if rows.is_empty() {
        return Err(CoreError::Validation(NO_VALID_ROWS_MESSAGE.to_string()));
    }

    Ok(ImportPlan { rows, skipped })
}
