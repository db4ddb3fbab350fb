//! Dashboard workbooks: the per-item detail export and the two dashboard
//! exports (master items, or valued items plus their entry lines).

use hermas_core::reporting::{
    format_date_label, format_download_date, format_generated_label, format_qty_text,
    or_placeholder, safe_sheet_title, slugify, summarise_qty, CURRENCY_FORMAT,
};
use hermas_core::types::Timestamp;
use hermas_db::models::dashboard::{DetailItem, EntryLine, ExportItemRow, ItemTotals};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};

/// A generated workbook ready to download.
#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

const ITEM_HEADERS: [&str; 9] = [
    "#",
    "Item Name",
    "Category",
    "Group",
    "Batches",
    "Entries Logged",
    "Total Quantity",
    "Total Value",
    "Unit",
];

const DETAIL_HEADERS: [&str; 10] = [
    "#",
    "Entry Date",
    "User",
    "Batch",
    "Mfg",
    "Exp",
    "Quantity",
    "Location",
    "Price",
    "Line Value",
];

const ENTRY_HEADERS: [&str; 12] = [
    "#",
    "Entry Date",
    "User",
    "Item Name",
    "Category",
    "Batch",
    "Mfg",
    "Exp",
    "Quantity",
    "Location",
    "Price",
    "Line Value",
];

struct Styles {
    header: Format,
    title: Format,
    subtitle: Format,
    caption: Format,
    label: Format,
    currency: Format,
    count: Format,
    center: Format,
    right: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x0F172A))
                .set_align(FormatAlign::Center),
            title: Format::new().set_bold().set_font_size(14),
            subtitle: Format::new().set_font_size(11).set_font_color(Color::RGB(0x606C80)),
            caption: Format::new().set_font_size(10).set_font_color(Color::RGB(0x64748B)),
            label: Format::new()
                .set_bold()
                .set_font_color(Color::RGB(0x334155))
                .set_background_color(Color::RGB(0xE2E8F0)),
            currency: Format::new()
                .set_num_format(CURRENCY_FORMAT)
                .set_align(FormatAlign::Right),
            count: Format::new().set_num_format("0").set_align(FormatAlign::Center),
            center: Format::new().set_align(FormatAlign::Center),
            right: Format::new().set_align(FormatAlign::Right),
        }
    }
}

/// Writes rows top to bottom and remembers where it is.
struct SheetWriter<'a> {
    sheet: &'a mut Worksheet,
    styles: &'a Styles,
    row: u32,
}

impl<'a> SheetWriter<'a> {
    fn new(sheet: &'a mut Worksheet, styles: &'a Styles) -> Self {
        Self { sheet, styles, row: 0 }
    }

    fn text(&mut self, col: u16, value: &str, format: Option<&Format>) -> Result<(), XlsxError> {
        if value.is_empty() {
            return Ok(());
        }
        match format {
            Some(f) => self.sheet.write_string_with_format(self.row, col, value, f)?,
            None => self.sheet.write_string(self.row, col, value)?,
        };
        Ok(())
    }

    fn number(&mut self, col: u16, value: f64, format: &Format) -> Result<(), XlsxError> {
        self.sheet
            .write_number_with_format(self.row, col, value, format)?;
        Ok(())
    }

    fn next_row(&mut self) {
        self.row += 1;
    }

    fn header(&mut self, headers: &[&str]) -> Result<(), XlsxError> {
        let style = &self.styles.header;
        for (col, name) in headers.iter().enumerate() {
            self.sheet
                .write_string_with_format(self.row, col as u16, *name, style)?;
            self.sheet.set_column_width(col as u16, column_width(name))?;
        }
        self.next_row();
        Ok(())
    }

    fn title_block(&mut self, title: &str, generated: &str) -> Result<(), XlsxError> {
        let styles = self.styles;
        self.text(0, title, Some(&styles.title))?;
        self.next_row();
        self.text(0, &format!("Generated on {generated}"), Some(&styles.subtitle))?;
        self.next_row();
        Ok(())
    }

    fn key_value(
        &mut self,
        label: &str,
        write: impl FnOnce(&mut Self) -> Result<(), XlsxError>,
    ) -> Result<(), XlsxError> {
        let styles = self.styles;
        self.text(0, label, Some(&styles.label))?;
        write(self)?;
        self.next_row();
        Ok(())
    }

    fn item_row(&mut self, index: usize, row: &ExportItemRow) -> Result<(), XlsxError> {
        let styles = self.styles;
        self.number(0, index as f64, &styles.center)?;
        self.text(1, &row.item_name, None)?;
        self.text(2, &or_placeholder(row.category_name.as_deref()), None)?;
        self.text(3, &or_placeholder(row.group_name.as_deref()), None)?;
        self.number(4, row.batches.unwrap_or(0) as f64, &styles.count)?;
        self.number(5, row.entries_logged.unwrap_or(0) as f64, &styles.count)?;
        self.text(
            6,
            &format_qty_text(row.total_qty.unwrap_or(0.0), Some(row.unit.as_str())),
            Some(&styles.right),
        )?;
        self.number(7, row.total_value.unwrap_or(0.0), &styles.currency)?;
        self.text(8, &row.unit, None)?;
        self.next_row();
        Ok(())
    }

    fn price_cells(&mut self, col: u16, line: &EntryLine) -> Result<(), XlsxError> {
        let styles = self.styles;
        if let Some(price) = line.price {
            self.number(col, price, &styles.currency)?;
        }
        self.number(col + 1, line.line_value, &styles.currency)
    }
}

fn column_width(header: &str) -> f64 {
    match header {
        "#" => 6.0,
        "Item Name" => 32.0,
        "Category" | "Group" | "Location" | "User" => 20.0,
        _ => 15.0,
    }
}

/// `<slug>_summary.xlsx` workbook for one item.
pub fn detail_workbook(
    item: &DetailItem,
    totals: &ItemTotals,
    lines: &[EntryLine],
    now: Timestamp,
) -> Result<ExportFile, XlsxError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(safe_sheet_title(&format!("{}_Summary", item.item_name)))?;

    let mut w = SheetWriter::new(sheet, &styles);
    let item_title = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_font_color(Color::RGB(0x1F2937));
    w.text(0, &item.item_name, Some(&item_title))?;
    w.next_row();
    let category = item.category_name.as_deref().unwrap_or("Uncategorised");
    w.text(0, &format!("Category: {category}"), Some(&styles.subtitle))?;
    w.next_row();
    w.text(
        0,
        &format!("Exported On: {}", format_generated_label(now)),
        Some(&styles.caption),
    )?;
    w.next_row();

    let pairs: Vec<(f64, Option<&str>)> = lines
        .iter()
        .map(|l| (l.qty, Some(l.unit.as_str())))
        .collect();
    let qty_text = if pairs.is_empty() {
        format_qty_text(totals.total_qty, Some(item.unit.as_str()))
    } else {
        summarise_qty(&pairs)
    };
    w.key_value("Total Qty Counted", |w| w.text(1, &qty_text, None))?;
    w.key_value("Total Inventory Value", |w| {
        w.number(1, totals.total_value, &styles.currency)
    })?;
    w.key_value("Batches", |w| w.number(1, totals.batches as f64, &styles.count))?;
    w.key_value("Entries logged", |w| {
        w.number(1, totals.entries_logged as f64, &styles.count)
    })?;

    w.next_row();
    w.header(&DETAIL_HEADERS)?;

    for (index, line) in lines.iter().enumerate() {
        w.number(0, (index + 1) as f64, &styles.center)?;
        w.text(1, &format_date_label(line.created_at.date_naive()), Some(&styles.center))?;
        w.text(2, &line.username, None)?;
        w.text(3, line.batch.as_deref().unwrap_or(""), None)?;
        w.text(4, line.mfg.as_deref().unwrap_or(""), Some(&styles.center))?;
        w.text(5, line.exp.as_deref().unwrap_or(""), Some(&styles.center))?;
        w.text(6, &format_qty_text(line.qty, Some(line.unit.as_str())), Some(&styles.right))?;
        w.text(7, &line.location, None)?;
        w.price_cells(8, line)?;
        w.next_row();
    }

    Ok(ExportFile {
        filename: format!("{}_summary.xlsx", slugify(&item.item_name)),
        bytes: workbook.save_to_buffer()?,
    })
}

/// "Master Items" workbook listing every item, counted ones first.
pub fn master_items_workbook(
    items: &[ExportItemRow],
    now: Timestamp,
) -> Result<ExportFile, XlsxError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Master Items")?;

    let mut w = SheetWriter::new(sheet, &styles);
    w.title_block("Master Item Inventory Report", &format_generated_label(now))?;
    w.header(&ITEM_HEADERS)?;
    for (index, row) in items.iter().enumerate() {
        w.item_row(index + 1, row)?;
    }

    Ok(ExportFile {
        filename: format!("export_with_master_items_{}.xlsx", format_download_date(now)),
        bytes: workbook.save_to_buffer()?,
    })
}

/// "Valued Items" and "Valued Entries" workbook: only items with entries.
pub fn valued_workbook(
    items: &[ExportItemRow],
    lines: &[EntryLine],
    now: Timestamp,
) -> Result<ExportFile, XlsxError> {
    let styles = Styles::new();
    let generated = format_generated_label(now);
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Valued Items")?;
        let mut w = SheetWriter::new(sheet, &styles);
        w.title_block("Valued Item Report", &generated)?;
        w.header(&ITEM_HEADERS)?;
        for (index, row) in items.iter().filter(|r| r.has_entries()).enumerate() {
            w.item_row(index + 1, row)?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Valued Entries")?;
        let mut w = SheetWriter::new(sheet, &styles);
        w.title_block("Valued Logged Entries", &generated)?;
        w.header(&ENTRY_HEADERS)?;
        for (index, line) in lines.iter().enumerate() {
            w.number(0, (index + 1) as f64, &styles.center)?;
            w.text(1, &format_date_label(line.created_at.date_naive()), Some(&styles.center))?;
            w.text(2, &line.username, None)?;
            w.text(3, &line.item_name, None)?;
            w.text(4, &or_placeholder(line.category_name.as_deref()), None)?;
            w.text(5, &or_placeholder(line.batch.as_deref()), None)?;
            w.text(6, line.mfg.as_deref().unwrap_or(""), Some(&styles.center))?;
            w.text(7, line.exp.as_deref().unwrap_or(""), Some(&styles.center))?;
            w.text(8, &format_qty_text(line.qty, Some(line.unit.as_str())), Some(&styles.right))?;
            w.text(9, &or_placeholder(Some(line.location.as_str())), None)?;
            w.price_cells(10, line)?;
            w.next_row();
        }
    }

    Ok(ExportFile {
        filename: format!("export_valued_items_{}.xlsx", format_download_date(now)),
        bytes: workbook.save_to_buffer()?,
    })
}
