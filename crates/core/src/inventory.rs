//! Master-data rules: the official category groups and name checks.

use crate::error::CoreError;

/// The only category groups the application recognises, in display order.
///
/// Must match the seed data inserted by the `hermas-seed` binary.
pub const CORE_INVENTORY_GROUPS: [&str; 3] =
    ["Finished Goods", "Raw Materials", "Semi Finished Goods"];

/// Inventory session status that restricts exports.
pub const SESSION_STATUS_ACTIVE: &str = "active";

/// Exact-match check used when importing spreadsheets.
pub fn is_core_group(name: &str) -> bool {
    CORE_INVENTORY_GROUPS.contains(&name)
}

/// Position of a group in [`CORE_INVENTORY_GROUPS`], if it is official.
pub fn core_group_rank(name: &str) -> Option<usize> {
    CORE_INVENTORY_GROUPS.iter().position(|g| *g == name)
}

/// Trim a master-data name and reject blanks.
pub fn normalize_name(raw: &str, what: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{what} is required")));
    }
    Ok(trimmed.to_string())
}

/// Prices are optional but never negative.
pub fn validate_price(price: Option<f64>) -> Result<(), CoreError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(CoreError::Validation(
            "Price must be zero or greater".to_string(),
        )),
        _ => Ok(()),
    }
}
