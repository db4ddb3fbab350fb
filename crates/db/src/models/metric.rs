//! Units of measure.

use hermas_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `metrics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Metric {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateMetric {
    pub name: String,
}
