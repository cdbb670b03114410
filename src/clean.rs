// src/clean.rs
//
// Record cleanup between extraction and export. Pure and idempotent.

use chrono::NaiveDate;

use crate::config::consts::{DATE_COLUMN_MARKERS, SINGLE_LINE_COLUMNS};
use crate::core::sanitize::join_lines;
use crate::data::{Cell, Record};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y年%m月%d日"];

pub fn sanitize_records(records: Vec<Record>) -> Vec<Record> {
    records.into_iter().map(sanitize_record).collect()
}

pub fn sanitize_record(record: Record) -> Record {
    let fields = record
        .into_fields()
        .into_iter()
        .map(|(name, cell)| {
            let cell = clean_cell(&name, cell.unwrap_or_else(|| Cell::text("")));
            (name, Some(cell))
        })
        .collect();
    Record::from_fields(fields)
}

fn clean_cell(column: &str, cell: Cell) -> Cell {
    match cell {
        Cell::Text(t) => Cell::Text(clean_value(column, &t)),
        Cell::Link { label, url } => Cell::Link { label: clean_value(column, &label), url: s!(url.trim()) },
    }
}

fn clean_value(column: &str, raw: &str) -> String {
    let mut v = s!(raw.trim());
    if SINGLE_LINE_COLUMNS.contains(&column) {
        v = join_lines(&v);
    }
    if DATE_COLUMN_MARKERS.iter().any(|m| column.contains(m)) {
        if let Some(d) = normalize_date(&v) {
            v = d;
        }
    }
    v
}

/// `2025/9/1`, `2025年09月01日`, `2025-9-1` → `2025-09-01`.
pub fn normalize_date(v: &str) -> Option<String> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(v, f).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}
