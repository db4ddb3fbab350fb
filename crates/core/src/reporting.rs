//! Text formatting shared by the dashboard spreadsheet exports.

use chrono::NaiveDate;

use crate::types::Timestamp;

/// Spreadsheet number format for rupee amounts.
pub const CURRENCY_FORMAT: &str = "₹#,##0.00";

/// Rendered in place of a missing category, group, batch or location.
pub const PLACEHOLDER: &str = "—";

/// Fallback file stem when a name slugifies to nothing.
pub const DEFAULT_SLUG: &str = "dashboard-export";

/// Excel's hard limit on worksheet name length.
pub const MAX_SHEET_TITLE_CHARS: usize = 31;

/// Group the integer digits of an already formatted number with commas.
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `1234.5` becomes `"1,234.5"`: fixed decimals, then trailing zeros dropped.
pub fn format_decimal_label(value: f64, decimals: usize) -> String {
    let fixed = group_thousands(&format!("{value:.decimals$}"));
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Quantity with its unit, e.g. `"12.5 kg"`.
pub fn format_qty_text(value: f64, unit: Option<&str>) -> String {
    let base = format_decimal_label(value, 3);
    let unit = unit.map(str::trim).unwrap_or("");
    format!("{base} {unit}").trim().to_string()
}

/// Sum quantities per unit, in first-seen unit order, e.g. `"5 kg + 2 ltr"`.
pub fn summarise_qty(pairs: &[(f64, Option<&str>)]) -> String {
    let mut order: Vec<String> = Vec::new();
    let mut totals: Vec<f64> = Vec::new();
    for (value, unit) in pairs {
        let key = unit.map(str::trim).unwrap_or("").to_string();
        match order.iter().position(|u| *u == key) {
            Some(idx) => totals[idx] += value,
            None => {
                order.push(key);
                totals.push(*value);
            }
        }
    }
    let parts: Vec<String> = order
        .iter()
        .zip(totals.iter())
        .filter(|(_, total)| **total != 0.0)
        .map(|(unit, total)| format_qty_text(*total, (!unit.is_empty()).then_some(unit.as_str())))
        .collect();
    if parts.is_empty() {
        "0".to_string()
    } else {
        parts.join(" + ")
    }
}

/// `dd/mm/YYYY`.
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm/YYYY HH:MM UTC`, used for "Exported On" / "Generated on" lines.
pub fn format_generated_label(at: Timestamp) -> String {
    at.format("%d/%m/%Y %H:%M UTC").to_string()
}

/// `dd-Mon-YYYY`, used in export file names.
pub fn format_download_date(at: Timestamp) -> String {
    at.format("%d-%b-%Y").to_string()
}

/// Lower-case alphanumerics, everything else collapsed into single dashes.
pub fn slugify(value: &str) -> String {
    let mapped: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                '-'
            }
        })
        .collect();
    let slug = mapped
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

/// Worksheet names may not contain `[]:*?/\` and are capped at 31 characters.
pub fn safe_sheet_title(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { ' ' } else { c })
        .collect();
    let cleaned = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    };
    cleaned.chars().take(MAX_SHEET_TITLE_CHARS).collect()
}

/// Missing or blank text renders as [`PLACEHOLDER`].
pub fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn decimal_labels_strip_trailing_zeros() {
        assert_eq!(format_decimal_label(1234.5, 3), "1,234.5");
        assert_eq!(format_decimal_label(100.0, 3), "100");
        assert_eq!(format_decimal_label(0.0, 3), "0");
        assert_eq!(format_decimal_label(1234567.125, 3), "1,234,567.125");
        assert_eq!(format_decimal_label(-2500.25, 3), "-2,500.25");
    }

    #[test]
    fn qty_text_appends_unit() {
        assert_eq!(format_qty_text(12.5, Some("kg")), "12.5 kg");
        assert_eq!(format_qty_text(3.0, None), "3");
        assert_eq!(format_qty_text(3.0, Some("  ")), "3");
    }

    #[test]
    fn summary_groups_by_unit() {
        let pairs = [(2.0, Some("kg")), (1.5, Some("ltr")), (3.0, Some("kg")), (0.0, Some("nos"))];
        assert_eq!(summarise_qty(&pairs), "5 kg + 1.5 ltr");
        assert_eq!(summarise_qty(&[]), "0");
    }

    #[test]
    fn dates_format_day_first() {
        let d = NaiveDate::from_ymd_opt(2025, 9, 4).unwrap();
        assert_eq!(format_date_label(d), "04/09/2025");
        let at = Utc.with_ymd_and_hms(2025, 9, 4, 8, 5, 0).unwrap();
        assert_eq!(format_generated_label(at), "04/09/2025 08:05 UTC");
        assert_eq!(format_download_date(at), "04-Sep-2025");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Majun  Khas (500g)"), "majun-khas-500g");
        assert_eq!(slugify("***"), DEFAULT_SLUG);
    }

    #[test]
    fn sheet_titles_are_sanitised() {
        assert_eq!(safe_sheet_title("a/b:c"), "a b c");
        assert_eq!(safe_sheet_title(""), "Sheet");
        assert_eq!(safe_sheet_title(&"x".repeat(40)).chars().count(), 31);
    }

    #[test]
    fn placeholder_for_blank_text() {
        assert_eq!(or_placeholder(None), PLACEHOLDER);
        assert_eq!(or_placeholder(Some(" ")), PLACEHOLDER);
        assert_eq!(or_placeholder(Some("Herbs")), "Herbs");
    }
}
