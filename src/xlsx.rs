// src/xlsx.rs
//
// Excel output. Link cells become real hyperlinks; a URL Excel refuses
// (unknown scheme, too long) is written as the plain label instead.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::core::sanitize::sanitize_sheet_name;
use crate::data::{Cell, Column, Record, SheetTable, column_layout};

const MAX_COL_WIDTH: usize = 60;

/// One worksheet `sheet_name` with a bold, frozen header row.
pub fn records_to_bytes(records: &[Record], sheet_name: &str) -> Result<Vec<u8>, XlsxError> {
    let columns = column_layout(records, &[], false);

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(sanitize_sheet_name(sheet_name, "Sheet1"))?;

    let bold = Format::new().set_bold();
    let mut widths: Vec<usize> = columns.iter().map(|c| display_width(c.header())).collect();

    for (ci, col) in columns.iter().enumerate() {
        ws.write_string_with_format(0, ci as u16, col.header(), &bold)?;
    }

    for (ri, rec) in records.iter().enumerate() {
        let row = ri as u32 + 1;
        for (ci, col) in columns.iter().enumerate() {
            let Column::Value(name) = col else { continue };
            let Some(cell) = rec.get(name) else { continue };
            write_cell(ws, row, ci as u16, cell)?;
            widths[ci] = widths[ci].max(display_width(cell.label()));
        }
    }

    ws.set_freeze_panes(1, 0)?;
    set_widths(ws, &widths)?;
    wb.save_to_buffer()
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), XlsxError> {
    match cell {
        Cell::Text(t) => {
            ws.write_string(row, col, t)?;
        }
        Cell::Link { label, url } => {
            if let Err(e) = ws.write_url_with_text(row, col, url.as_str(), label.as_str()) {
                debug!(%url, error = %e, "hyperlink rejected, writing label only");
                ws.write_string(row, col, label)?;
            }
        }
    }
    Ok(())
}

/// One worksheet per table. Names are made Excel-safe and unique.
pub fn sheets_to_bytes(tables: &[SheetTable]) -> Result<Vec<u8>, XlsxError> {
    let mut wb = Workbook::new();
    let mut used: Vec<String> = Vec::with_capacity(tables.len());

    for (i, t) in tables.iter().enumerate() {
        let name = unique_sheet_name(&t.name, i + 1, &used);
        let ws = wb.add_worksheet();
        ws.set_name(&name)?;
        used.push(name);

        for (ri, row) in t.rows.iter().enumerate() {
            for (ci, v) in row.iter().enumerate() {
                if !v.is_empty() {
                    ws.write_string(ri as u32, ci as u16, v)?;
                }
            }
        }
    }
    wb.save_to_buffer()
}

fn unique_sheet_name(raw: &str, n: usize, used: &[String]) -> String {
    let base = sanitize_sheet_name(raw, &format!("Sheet{n}"));
    let taken = |s: &str| used.iter().any(|u| u.to_lowercase() == s.to_lowercase());
    if !taken(&base) {
        return base;
    }
    (2..)
        .map(|k| {
            let suffix = format!("_{k}");
            let keep = 31 - suffix.chars().count();
            format!("{}{suffix}", base.chars().take(keep).collect::<String>())
        })
        .find(|s| !taken(s))
        .unwrap_or(base)
}

/// CJK glyphs take about two columns.
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

fn set_widths(ws: &mut Worksheet, widths: &[usize]) -> Result<(), XlsxError> {
    for (ci, w) in widths.iter().enumerate() {
        ws.set_column_width(ci as u16, (*w).clamp(6, MAX_COL_WIDTH) as f64 + 2.0)?;
    }
    Ok(())
}
