// src/specs/listing.rs
//
// Listing table → records.
//
// Header row: the first <tr> with <th> cells and no <td>.
// Data rows: every other <tr> with at least one <td>.
// Column names are re-read from each page's header.

use scraper::{ElementRef, Html};

use super::ListingSpec;
use crate::core::html::{child_elements, first_href, selector, text_lines, text_of};
use crate::data::{Cell, Record};
use crate::error::ParseError;

const CELL_TAGS: &[&str] = &["td", "th"];

/// Ordered `(column name, column index)` pairs for one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderMap(Vec<(String, usize)>);

impl HeaderMap {
    /// Blank labels become `column_{i}`; repeats get `_2`, `_3`, …
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut out: Vec<(String, usize)> = Vec::with_capacity(labels.len());
        for (i, raw) in labels.iter().enumerate() {
            let base = match raw.as_ref().trim() {
                "" => format!("column_{i}"),
                t => s!(t),
            };
            let mut name = base.clone();
            let mut n = 2;
            while out.iter().any(|(taken, _)| *taken == name) {
                name = format!("{base}_{n}");
                n += 1;
            }
            out.push((name, i));
        }
        Self(out)
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Name for cell `i`; cells past the header are `column_{i}`.
    pub fn name_at(&self, i: usize) -> String {
        self.0
            .iter()
            .find(|(_, idx)| *idx == i)
            .map(|(n, _)| n.clone())
            .unwrap_or_else(|| format!("column_{i}"))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

fn is_header_row(tr: ElementRef<'_>) -> bool {
    let mut has_th = false;
    for c in child_elements(tr, CELL_TAGS) {
        match c.value().name() {
            "td" => return false,
            _ => has_th = true,
        }
    }
    has_th
}

fn is_data_row(tr: ElementRef<'_>) -> bool {
    child_elements(tr, CELL_TAGS).any(|c| c.value().name() == "td")
}

pub fn read_headers(table: ElementRef<'_>) -> Option<HeaderMap> {
    let tr_sel = selector("tr").ok()?;
    let row = table.select(&tr_sel).find(|tr| is_header_row(*tr))?;
    let labels: Vec<String> = child_elements(row, CELL_TAGS).map(text_of).collect();
    Some(HeaderMap::from_labels(&labels))
}

/// Extract every data row of the listing table in `markup`.
/// A table without data rows yields an empty vec.
pub fn extract_rows(markup: &str, spec: &ListingSpec) -> Result<Vec<Record>, ParseError> {
    let doc = Html::parse_document(markup);
    let table_sel = selector(&spec.table_selector)?;
    let tr_sel = selector("tr")?;

    let table = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| ParseError::TableMissing { selector: spec.table_selector.clone() })?;
    let headers = read_headers(table)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ParseError::HeaderMissing { selector: spec.table_selector.clone() })?;

    let mut records = Vec::new();
    for tr in table.select(&tr_sel).filter(|tr| is_data_row(*tr)) {
        let cells: Vec<ElementRef<'_>> = child_elements(tr, CELL_TAGS).collect();
        let mut rec = Record::new();

        for (i, el) in cells.iter().enumerate() {
            let name = headers.name_at(i);
            let label = text_lines(*el);
            let cell = match spec.is_link_column(&name).then(|| first_href(*el, &spec.base_url)).flatten() {
                Some(url) => Cell::link(label, url),
                None => Cell::Text(label),
            };
            rec.push(name, Some(cell));
        }
        // short row: remaining header columns are missing
        for i in cells.len()..headers.len() {
            rec.push(headers.name_at(i), None);
        }
        records.push(rec);
    }
    Ok(records)
}
