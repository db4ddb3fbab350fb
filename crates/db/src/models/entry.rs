//! Stock entry model and DTOs.

use chrono::NaiveDate;
use hermas_core::entry::{normalize_optional_text, validate_qty, EntryType};
use hermas_core::error::CoreError;
use hermas_core::inventory::{normalize_name, validate_price};
use hermas_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An entry row joined with its item, location and author names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Entry {
    pub id: DbId,
    pub session_id: DbId,
    pub item_id: DbId,
    pub item_name: String,
    pub category_id: Option<DbId>,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub unit: String,
    pub qty: f64,
    pub warehouse_id: DbId,
    pub warehouse_name: String,
    pub batch: Option<String>,
    pub mfg: Option<String>,
    pub exp: Option<String>,
    pub price_at_entry: Option<f64>,
    pub user_id: DbId,
    pub username: String,
    /// UTC calendar day of `created_at`.
    pub entry_date: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /entries`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntry {
    pub session_id: DbId,
    pub item_id: DbId,
    pub category_id: Option<DbId>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub unit: String,
    pub qty: f64,
    pub warehouse_id: DbId,
    pub batch: Option<String>,
    pub price_at_entry: Option<f64>,
    pub mfg: Option<String>,
    pub exp: Option<String>,
    pub entry_date: Option<NaiveDate>,
}

impl CreateEntry {
    /// Trim free text, require a unit and reject negative numbers.
    pub fn normalized(self) -> Result<CreateEntry, CoreError> {
        validate_qty(self.qty)?;
        validate_price(self.price_at_entry)?;
        Ok(CreateEntry {
            unit: normalize_name(&self.unit, "Unit")?,
            batch: normalize_optional_text(self.batch),
            mfg: normalize_optional_text(self.mfg),
            exp: normalize_optional_text(self.exp),
            ..self
        })
    }
}

/// Request body for `PUT /entries/{id}`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntry {
    pub qty: Option<f64>,
    pub warehouse_id: Option<DbId>,
    pub batch: Option<String>,
    pub price_at_entry: Option<f64>,
    pub mfg: Option<String>,
    pub exp: Option<String>,
    pub entry_date: Option<NaiveDate>,
}

impl UpdateEntry {
    pub fn normalized(self) -> Result<UpdateEntry, CoreError> {
        if let Some(qty) = self.qty {
            validate_qty(qty)?;
        }
        validate_price(self.price_at_entry)?;
        Ok(UpdateEntry {
            batch: normalize_optional_text(self.batch),
            mfg: normalize_optional_text(self.mfg),
            exp: normalize_optional_text(self.exp),
            ..self
        })
    }
}

/// Query string for `GET /entries`.
#[derive(Debug, Default, Deserialize)]
pub struct EntryListParams {
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
}

/// Request body for `POST /entries/bulk-delete`.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteEntries {
    pub entry_ids: Vec<DbId>,
}
