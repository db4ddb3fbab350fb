//! Stock entry types and the small normalisation rules applied to entry input.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::rbac::{Permission, ScopeField};
use crate::types::Timestamp;

/// Which inventory sheet an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Raw,
    Sfg,
    Fg,
}

impl EntryType {
    pub const ALL: [EntryType; 3] = [EntryType::Raw, EntryType::Sfg, EntryType::Fg];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Raw => "raw",
            EntryType::Sfg => "sfg",
            EntryType::Fg => "fg",
        }
    }

    /// Parse a query or body value (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_lowercase().as_str() {
            "raw" => Ok(EntryType::Raw),
            "sfg" => Ok(EntryType::Sfg),
            "fg" => Ok(EntryType::Fg),
            _ => Err(CoreError::Validation("Invalid entry type".to_string())),
        }
    }

    pub fn add_permission(self) -> Permission {
        match self {
            EntryType::Raw => Permission::AddEntryRaw,
            EntryType::Sfg => Permission::AddEntrySfg,
            EntryType::Fg => Permission::AddEntryFg,
        }
    }

    pub fn edit_permission(self) -> Permission {
        match self {
            EntryType::Raw => Permission::EditEntryRaw,
            EntryType::Sfg => Permission::EditEntrySfg,
            EntryType::Fg => Permission::EditEntryFg,
        }
    }

    pub fn bulk_permission(self) -> Permission {
        match self {
            EntryType::Raw => Permission::BulkEditDeleteRaw,
            EntryType::Sfg => Permission::BulkEditDeleteSfg,
            EntryType::Fg => Permission::BulkEditDeleteFg,
        }
    }

    pub fn view_permission(self) -> Permission {
        match self {
            EntryType::Raw => Permission::ViewRaw,
            EntryType::Sfg => Permission::ViewSfg,
            EntryType::Fg => Permission::ViewFg,
        }
    }

    pub fn scope_field(self) -> ScopeField {
        match self {
            EntryType::Raw => ScopeField::Raw,
            EntryType::Sfg => ScopeField::Sfg,
            EntryType::Fg => ScopeField::Fg,
        }
    }
}

impl TryFrom<String> for EntryType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim free-text batch/mfg/exp fields; blank becomes `None`.
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Timestamp stored for a new entry: the chosen day at midnight UTC, or `now`.
pub fn entry_timestamp(entry_date: Option<NaiveDate>, now: Timestamp) -> Timestamp {
    match entry_date {
        Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
        None => now,
    }
}

/// Move an existing timestamp to another day, keeping its time of day.
pub fn move_to_date(existing: Timestamp, date: NaiveDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(existing.time()))
}

/// Quantities are counts of physical stock and can never be negative.
pub fn validate_qty(qty: f64) -> Result<(), CoreError> {
    if !qty.is_finite() || qty < 0.0 {
        return Err(CoreError::Validation(
            "Quantity must be zero or greater".to_string(),
        ));
    }
    Ok(())
}

/// De-duplicate ids while keeping their first-seen order.
pub fn dedupe_ids<T: Copy + PartialEq>(ids: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn parses_entry_types() {
        assert_eq!(EntryType::parse("RAW").unwrap(), EntryType::Raw);
        assert_eq!(EntryType::parse("sfg").unwrap(), EntryType::Sfg);
        assert!(EntryType::parse("wip").is_err());
    }

    #[test]
    fn permissions_follow_type() {
        assert_eq!(EntryType::Fg.add_permission(), Permission::AddEntryFg);
        assert_eq!(EntryType::Sfg.edit_permission(), Permission::EditEntrySfg);
        assert_eq!(EntryType::Raw.bulk_permission(), Permission::BulkEditDeleteRaw);
        assert_eq!(EntryType::Raw.scope_field(), ScopeField::Raw);
    }

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(normalize_optional_text(Some("  ".into())), None);
        assert_eq!(
            normalize_optional_text(Some(" 03/2025 ".into())),
            Some("03/2025".to_string())
        );
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn entry_date_is_midnight_utc() {
        let now = Utc::now();
        let date = NaiveDate::from_ymd_opt(2025, 9, 14).unwrap();
        let ts = entry_timestamp(Some(date), now);
        assert_eq!(ts.date_naive(), date);
        assert_eq!(ts.hour(), 0);
        assert_eq!(entry_timestamp(None, now), now);
    }

    #[test]
    fn moving_date_keeps_time_of_day() {
        let existing = Utc.with_ymd_and_hms(2025, 9, 1, 13, 45, 10).unwrap();
        let moved = move_to_date(existing, NaiveDate::from_ymd_opt(2025, 9, 20).unwrap());
        assert_eq!(moved, Utc.with_ymd_and_hms(2025, 9, 20, 13, 45, 10).unwrap());
    }

    #[test]
    fn rejects_negative_quantity() {
        assert!(validate_qty(0.0).is_ok());
        assert!(validate_qty(12.5).is_ok());
        assert!(validate_qty(-1.0).is_err());
        assert!(validate_qty(f64::NAN).is_err());
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        assert_eq!(dedupe_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
