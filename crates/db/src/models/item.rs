//! Item master model and DTOs.

use hermas_core::error::CoreError;
use hermas_core::inventory::{normalize_name, validate_price};
use hermas_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An item with its sub-category and group resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Item {
    pub id: DbId,
    pub name: String,
    pub unit: String,
    pub price: Option<f64>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub group_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /items`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItem {
    pub name: String,
    pub unit: String,
    pub price: Option<f64>,
    pub category_id: Option<DbId>,
}

impl CreateItem {
    /// Trim name and unit, reject blanks and negative prices.
    pub fn normalized(&self) -> Result<CreateItem, CoreError> {
        validate_price(self.price)?;
        Ok(CreateItem {
            name: normalize_name(&self.name, "Item name")?,
            unit: normalize_name(&self.unit, "Unit")?,
            price: self.price,
            category_id: self.category_id,
        })
    }
}

/// DTO for `PUT /items/{id}`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<DbId>,
}

impl UpdateItem {
    pub fn normalized(&self) -> Result<UpdateItem, CoreError> {
        validate_price(self.price)?;
        Ok(UpdateItem {
            name: self
                .name
                .as_deref()
                .map(|n| normalize_name(n, "Item name"))
                .transpose()?,
            unit: self
                .unit
                .as_deref()
                .map(|u| normalize_name(u, "Unit"))
                .transpose()?,
            price: self.price,
            category_id: self.category_id,
        })
    }
}

/// Query string for `GET /items`.
#[derive(Debug, Default, Deserialize)]
pub struct ItemListParams {
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_trimmed() {
        let input = CreateItem {
            name: "  Clove ".into(),
            unit: " kg".into(),
            price: Some(10.0),
            category_id: None,
        };
        let n = input.normalized().unwrap();
        assert_eq!(n.name, "Clove");
        assert_eq!(n.unit, "kg");
    }

    #[test]
    fn blank_unit_and_negative_price_are_rejected() {
        let blank = CreateItem {
            name: "Clove".into(),
            unit: " ".into(),
            price: None,
            category_id: None,
        };
        assert!(blank.normalized().is_err());

        let negative = UpdateItem {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.normalized().is_err());
    }
}
