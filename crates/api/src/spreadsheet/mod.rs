//! `.xlsx` reading (item master import) and writing (dashboard exports).

pub mod export;
pub mod reader;

/// MIME type sent with every generated workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
