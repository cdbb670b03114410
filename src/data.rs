// src/data.rs
//
// Records and the column layout shared by every exporter.
//
// - Record: one listing row, an ordered list of (column, cell) pairs.
//           Column names come from the page header, so two records from
//           different pages may not share the same set or order.
// - SheetTable: a named grid of plain strings (spreadsheet downloads).
// - Column: one output column. Link columns can be split into a label
//           column plus an adjacent URL column (CSV/JSON), or kept as one
//           hyperlink column (XLSX).

use crate::config::consts::LINK_URL_SUFFIX;

/// A single table cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    /// Hyperlink pair: visible label and target URL.
    Link { label: String, url: String },
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Cell::Link { label: label.into(), url: url.into() }
    }

    /// What a reader sees in the cell.
    pub fn label(&self) -> &str {
        match self {
            Cell::Text(s) => s,
            Cell::Link { label, .. } => label,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Cell::Text(_) => None,
            Cell::Link { url, .. } => Some(url),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self { Cell::text(s) }
}

impl From<String> for Cell {
    fn from(s: String) -> Self { Cell::Text(s) }
}

/// One extracted row, keyed by column label. `None` marks a missing cell
/// (row shorter than the header) until the sanitizer fills it in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Option<Cell>)>,
}

impl Record {
    pub fn new() -> Self { Self::default() }

    /// Append a field. A repeated name replaces the earlier value in place.
    pub fn push(&mut self, name: impl Into<String>, cell: Option<Cell>) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = cell,
            None => self.fields.push((name, cell)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, c)| c.as_ref())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&Cell>)> {
        self.fields.iter().map(|(n, c)| (n.as_str(), c.as_ref()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub(crate) fn into_fields(self) -> Vec<(String, Option<Cell>)> {
        self.fields
    }

    pub(crate) fn from_fields(fields: Vec<(String, Option<Cell>)>) -> Self {
        Self { fields }
    }
}

/// Column whose cells carry a URL, and the header used for the URL when
/// the output format has no native hyperlink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkColumn {
    pub column: String,
    pub url_header: String,
}

impl LinkColumn {
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        let url_header = format!("{column}{LINK_URL_SUFFIX}");
        Self { column, url_header }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Column {
    /// Cell label (text, or the visible part of a link).
    Value(String),
    /// URL half of a split link column.
    Url { source: String, header: String },
}

impl Column {
    pub fn header(&self) -> &str {
        match self {
            Column::Value(name) => name,
            Column::Url { header, .. } => header,
        }
    }

    /// Text this column shows for `record`; missing cells read as "".
    pub fn render<'r>(&self, record: &'r Record) -> &'r str {
        match self {
            Column::Value(name) => record.get(name).map(Cell::label).unwrap_or(""),
            Column::Url { source, .. } => record.get(source).and_then(Cell::url).unwrap_or(""),
        }
    }
}

/// Union of column names across `records`, in first-seen order.
/// With `split_links`, every configured link column that is present gets
/// its URL column right after it; a URL header that clashes with another
/// column gets a `_2`, `_3`… suffix.
pub fn column_layout(records: &[Record], links: &[LinkColumn], split_links: bool) -> Vec<Column> {
    let mut names: Vec<&str> = Vec::new();
    for r in records {
        for n in r.names() {
            if !names.contains(&n) {
                names.push(n);
            }
        }
    }

    let mut out = Vec::with_capacity(names.len() + links.len());
    for &n in &names {
        out.push(Column::Value(s!(n)));
        if !split_links { continue; }
        if let Some(link) = links.iter().find(|l| l.column == n) {
            let taken = |h: &str| names.contains(&h) || out.iter().any(|c: &Column| c.header() == h);
            let mut header = link.url_header.clone();
            let mut k = 2;
            while taken(&header) {
                header = format!("{}_{k}", link.url_header);
                k += 1;
            }
            out.push(Column::Url { source: s!(n), header });
        }
    }
    out
}

/// A named worksheet of plain text rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// True when every row is empty.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}
