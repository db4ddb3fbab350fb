//! Reads the first worksheet of an uploaded workbook into [`SheetCell`] rows.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use hermas_core::error::CoreError;
use hermas_core::import::SheetCell;

pub const INVALID_WORKBOOK_MESSAGE: &str = "Upload a valid .xlsx workbook";
pub const EMPTY_WORKBOOK_MESSAGE: &str = "The workbook is empty";

fn to_sheet_cell(cell: &Data) -> SheetCell {
    match cell {
        Data::Empty | Data::Error(_) => SheetCell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => SheetCell::Text(s.clone()),
        Data::Float(f) => SheetCell::Number(*f),
        Data::Int(i) => SheetCell::Number(*i as f64),
        Data::Bool(b) => SheetCell::Text(b.to_string()),
        Data::DateTime(dt) => SheetCell::Number(dt.as_f64()),
    }
}

/// All rows of the first worksheet, header row first.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<SheetCell>>, CoreError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|_| CoreError::Validation(INVALID_WORKBOOK_MESSAGE.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Unreadable first worksheet");
            return Err(CoreError::Validation(INVALID_WORKBOOK_MESSAGE.to_string()));
        }
        None => return Err(CoreError::Validation(EMPTY_WORKBOOK_MESSAGE.to_string())),
    };

    let rows: Vec<Vec<SheetCell>> = range
        .rows()
        .map(|row| row.iter().map(to_sheet_cell).collect())
        .collect();
    if rows.is_empty() {
        return Err(CoreError::Validation(EMPTY_WORKBOOK_MESSAGE.to_string()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;

    use super::*;

    fn workbook_bytes(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        build(workbook.add_worksheet());
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_text_and_numbers() {
        let bytes = workbook_bytes(|ws| {
            ws.write_string(0, 0, "Item Name").unwrap();
            ws.write_string(0, 1, "Price").unwrap();
            ws.write_string(1, 0, "Clove").unwrap();
            ws.write_number(1, 1, 12.5).unwrap();
        });
        let rows = read_first_sheet(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], SheetCell::Text("Item Name".into()));
        assert_eq!(rows[1][1], SheetCell::Number(12.5));
    }

    #[test]
    fn garbage_is_not_a_workbook() {
        let err = read_first_sheet(b"not a zip file").unwrap_err();
        assert!(err.to_string().contains(INVALID_WORKBOOK_MESSAGE));
    }

    #[test]
    fn blank_sheet_is_empty() {
        let bytes = workbook_bytes(|_| {});
        let err = read_first_sheet(&bytes).unwrap_err();
        assert!(err.to_string().contains(EMPTY_WORKBOOK_MESSAGE));
    }
}
