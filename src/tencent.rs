// src/tencent.rs
//
// Read-only Tencent Docs sheet → XLSX.
//
// The page never offers an export button, but the sheet data ships with it
// in one of a few shapes. Strategies, first hit wins:
//   offline (HTTP session carrying the browser's cookies)
//     a. dop-api/opendoc URLs in the HTML → JSONP `clientVarsCallback(...)`
//     b. base64 `basicClientVars` blob in the HTML
//   in the browser
//     c. front-end globals (padInitialData, g_InitialData, …)
//     d. opendoc fetched from inside the page with credentials

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SessionOptions;
use crate::core::net::{RetryPolicy, with_retry};
use crate::data::SheetTable;
use crate::error::{ConfigError, Error, ParseError};
use crate::fetch::SessionContext;

const DOCS_ORIGIN: &str = "https://docs.qq.com";
const PAGE_SETTLE: Duration = Duration::from_secs(20);
// Excel's grid limits; anything beyond is junk coordinates.
const MAX_ROWS: u64 = 1_048_576;
const MAX_COLS: u64 = 16_384;
// Padded cells one rebuilt sheet may hold.
const GRID_BUDGET: usize = 2_000_000;

static OPENDOC_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?:)?//docs\.qq\.com/dop-api/opendoc\?[^\s'"<>()]+"#).expect("static regex")
});

static BASIC_CLIENT_VARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)basicClientVars\s*=\s*JSON\.parse\(\s*decodeURIComponent\(\s*escape\(\s*atob\((?:'([^']*)'|"([^"]*)")\)"#,
    )
    .expect("static regex")
});

static JSONP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)clientVarsCallback\s*(?:&&\s*clientVarsCallback)?\s*\((.*)\)\s*;?\s*$").expect("static regex")
});

const JS_GLOBALS: &str = r#"(function () {
  function safe(o) { try { return JSON.stringify(o); } catch (e) { return null; } }
  var w = window, res = [];
  try { if (w.padInitialData) res.push({ k: 'padInitialData', v: safe(w.padInitialData) }); } catch (e) {}
  try { if (w.g_InitialData) res.push({ k: 'g_InitialData', v: safe(w.g_InitialData) }); } catch (e) {}
  try { if (w.__INITIAL_STATE__) res.push({ k: '__INITIAL_STATE__', v: safe(w.__INITIAL_STATE__) }); } catch (e) {}
  try { if (w.__NUXT__ && w.__NUXT__.state) res.push({ k: '__NUXT__.state', v: safe(w.__NUXT__.state) }); } catch (e) {}
  return JSON.stringify(res);
})()"#;

const JS_FETCH_OPENDOC: &str = r#"(async () => {
  const html = document.documentElement.innerHTML;
  const m = html.match(/(?:https?:)?\/\/docs\.qq\.com\/dop-api\/opendoc\?[^\s'"<>()]+/i);
  if (!m) return "";
  let url = m[0].replace(/&amp;/g, "&");
  if (url.startsWith("//")) url = window.location.protocol + url;
  const resp = await fetch(url, { credentials: "include" });
  return await resp.text();
})()"#;

#[derive(Deserialize)]
struct GlobalCandidate {
    k: String,
    v: Option<String>,
}

/// Download the sheet behind `doc_url` into an XLSX at `out`.
pub fn download(doc_url: &str, out: &Path, session: &SessionOptions, retry: RetryPolicy) -> Result<PathBuf, Error> {
    let tables = fetch_tables(doc_url, session, retry)?;
    Ok(crate::file::export_sheets(out, &tables)?)
}

pub fn fetch_tables(doc_url: &str, opts: &SessionOptions, retry: RetryPolicy) -> Result<Vec<SheetTable>, Error> {
    let url = Url::parse(doc_url).map_err(|source| ConfigError::Url { url: s!(doc_url), source })?;

    let ctx = SessionContext::open_browser(opts)?;
    if let Some(b) = ctx.browser() {
        with_retry(retry, doc_url, || b.render(doc_url, Some("body"), PAGE_SETTLE))?;
    }
    ctx.sync_cookies(&url)?;

    let headers = [("Referer", s!(doc_url)), ("Origin", s!(DOCS_ORIGIN))];
    match with_retry(retry, doc_url, || ctx.http().get_text_with(doc_url, &headers)) {
        Ok(html) => {
            let tables = from_opendoc_links(&ctx, &html, &headers);
            if !tables.is_empty() {
                info!(sheets = tables.len(), "sheet data from opendoc API");
                return Ok(tables);
            }
            let tables = from_basic_client_vars(&html);
            if !tables.is_empty() {
                info!(sheets = tables.len(), "sheet data from basicClientVars");
                return Ok(tables);
            }
        }
        Err(e) => warn!(error = %e, "plain fetch of the document failed, trying in the browser"),
    }

    if let Some(b) = ctx.browser() {
        let tables = b
            .eval_string(JS_GLOBALS, false)
            .map(|raw| raw.map(|r| from_globals(&r)).unwrap_or_default())
            .unwrap_or_else(|e| {
                debug!(error = %e, "reading page globals failed");
                Vec::new()
            });
        if !tables.is_empty() {
            return Ok(tables);
        }

        match b.eval_string(JS_FETCH_OPENDOC, true) {
            Ok(Some(body)) if !body.is_empty() => {
                let tables = parse_jsonp(&body);
                if !tables.is_empty() {
                    info!(sheets = tables.len(), "sheet data from in-page opendoc fetch");
                    return Ok(tables);
                }
            }
            Ok(_) => debug!("no opendoc URL inside the page"),
            Err(e) => debug!(error = %e, "in-page opendoc fetch failed"),
        }
    }

    Err(ParseError::NoTables { url: s!(doc_url) }.into())
}

fn from_opendoc_links(ctx: &SessionContext, html: &str, headers: &[(&'static str, String)]) -> Vec<SheetTable> {
    let urls = opendoc_urls(html);
    debug!(count = urls.len(), "opendoc URLs in page");
    for u in urls {
        match ctx.http().get_text_with(&u, headers) {
            Ok(body) => {
                let tables = parse_jsonp(&body);
                if !tables.is_empty() {
                    return tables;
                }
            }
            Err(e) => debug!(url = %u, error = %e, "opendoc request failed"),
        }
    }
    Vec::new()
}

fn from_basic_client_vars(html: &str) -> Vec<SheetTable> {
    let Some(caps) = BASIC_CLIENT_VARS.captures(html) else { return Vec::new() };
    let Some(b64) = caps.get(1).or_else(|| caps.get(2)) else { return Vec::new() };

    let b64 = html_escape::decode_html_entities(b64.as_str());
    let decoded = STANDARD
        .decode(b64.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|text| serde_json::from_str::<Value>(&text).ok());
    match decoded {
        Some(v) => tables_from_json(&v),
        None => {
            warn!("basicClientVars present but could not be decoded");
            Vec::new()
        }
    }
}

fn from_globals(raw: &str) -> Vec<SheetTable> {
    let Ok(candidates) = serde_json::from_str::<Vec<GlobalCandidate>>(raw) else { return Vec::new() };
    for c in candidates {
        let Some(v) = c.v.as_deref().and_then(|v| serde_json::from_str::<Value>(v).ok()) else { continue };
        let tables = tables_from_json(&v);
        if !tables.is_empty() {
            info!(global = %c.k, sheets = tables.len(), "sheet data from page global");
            return tables;
        }
    }
    Vec::new()
}

/// opendoc API URLs in `html`, entity-decoded, made absolute, de-duplicated.
pub fn opendoc_urls(html: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in OPENDOC_URL.find_iter(html) {
        let mut u = html_escape::decode_html_entities(m.as_str()).into_owned();
        if u.starts_with("//") {
            u.insert_str(0, "https:");
        }
        if !out.contains(&u) {
            out.push(u);
        }
    }
    out
}

/// Tables from a `clientVarsCallback(...)` JSONP body; empty when the body
/// is not that shape.
pub fn parse_jsonp(body: &str) -> Vec<SheetTable> {
    JSONP
        .captures(body.trim())
        .and_then(|c| serde_json::from_str::<Value>(&c[1]).ok())
        .map(|v| tables_from_json(&v))
        .unwrap_or_default()
}

/// Every sheet-like structure found anywhere in `root`.
pub fn tables_from_json(root: &Value) -> Vec<SheetTable> {
    let mut out = Vec::new();
    scan(root, &mut out);
    out
}

fn scan(node: &Value, out: &mut Vec<SheetTable>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::Array(sheets)) = first_truthy(map, &["sheets", "sheetList"]) {
                for s in sheets {
                    let Value::Object(sheet) = s else { continue };
                    let name = first_truthy(sheet, &["name", "title"]).map(cell_text);
                    match grid(sheet) {
                        Some(rows) => add_table(out, name, rows),
                        None => scan(s, out),
                    }
                }
            } else {
                match grid(map) {
                    Some(rows) => add_table(out, map.get("name").map(cell_text), rows),
                    None => map.values().for_each(|v| scan(v, out)),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| scan(v, out)),
        _ => {}
    }
}

fn add_table(out: &mut Vec<SheetTable>, name: Option<String>, rows: Vec<Vec<String>>) {
    let table = SheetTable {
        name: name.filter(|n| !n.is_empty()).unwrap_or_else(|| format!("Sheet{}", out.len() + 1)),
        rows,
    };
    if !table.is_blank() {
        out.push(table);
    }
}

fn grid(sheet: &Map<String, Value>) -> Option<Vec<Vec<String>>> {
    from_rows(sheet).or_else(|| from_celldata(sheet))
}

fn from_rows(sheet: &Map<String, Value>) -> Option<Vec<Vec<String>>> {
    let Some(Value::Array(rows)) = first_truthy(sheet, &["rows", "data"]) else { return None };

    let mut data = Vec::with_capacity(rows.len());
    for r in rows {
        match r {
            Value::Object(row) => {
                let cells = match row.get("cells") {
                    Some(Value::Array(c)) => c.as_slice(),
                    _ => &[],
                };
                data.push(cells.iter().map(row_cell_text).collect());
            }
            Value::Array(cells) => data.push(cells.iter().map(cell_text).collect()),
            _ => {}
        }
    }
    (!data.is_empty()).then_some(data)
}

/// `{v: ...}` / `{value: ...}`, where the value may itself be `{text: ...}`.
fn row_cell_text(cell: &Value) -> String {
    let Value::Object(c) = cell else { return cell_text(cell) };
    let v = c.get("v").or_else(|| c.get("value"));
    match v {
        Some(Value::Object(inner)) => match inner.get("text") {
            Some(t) => cell_text(t),
            None => cell_text(v.unwrap_or(&Value::Null)),
        },
        Some(other) => cell_text(other),
        None => s!(),
    }
}

fn from_celldata(sheet: &Map<String, Value>) -> Option<Vec<Vec<String>>> {
    let Some(Value::Array(cells)) = first_truthy(sheet, &["celldata", "cellData"]) else { return None };

    let placed: Vec<(usize, usize, String)> = cells
        .iter()
        .filter_map(|item| {
            let r = coord(item.get("r")?)?;
            let c = coord(item.get("c")?)?;
            if r >= MAX_ROWS || c >= MAX_COLS {
                return None;
            }
            let text = match item.get("v") {
                Some(Value::Object(v)) => v.get("m").map(cell_text).unwrap_or_default(),
                Some(v) => cell_text(v),
                None => s!(),
            };
            Some((r as usize, c as usize, text))
        })
        .collect();
    if placed.is_empty() {
        return None;
    }

    let rows = placed.iter().map(|p| p.0).max().unwrap_or(0) + 1;
    let cols = placed.iter().map(|p| p.1).max().unwrap_or(0) + 1;
    if rows.saturating_mul(cols) > GRID_BUDGET {
        return Some(ragged_grid(placed, rows));
    }
    let mut grid = vec![vec![s!(); cols]; rows];
    for (r, c, text) in placed {
        grid[r][c] = text;
    }
    Some(grid)
}

/// Sparse layout: each row only reaches its last filled cell. Cells whose
/// padding would push the sheet past `GRID_BUDGET` are dropped.
fn ragged_grid(mut placed: Vec<(usize, usize, String)>, rows: usize) -> Vec<Vec<String>> {
    placed.sort_by_key(|p| (p.0, p.1));
    let mut grid: Vec<Vec<String>> = Vec::new();
    grid.resize_with(rows, Vec::new);
    let mut slots = 0usize;
    let mut dropped = 0usize;
    for (r, c, text) in placed {
        let row = &mut grid[r];
        let grow = (c + 1).saturating_sub(row.len());
        if slots + grow > GRID_BUDGET {
            dropped += 1;
            continue;
        }
        slots += grow;
        if grow > 0 {
            row.resize(c + 1, s!());
        }
        row[c] = text;
    }
    if dropped > 0 {
        warn!(dropped, "sparse sheet too large, cells dropped");
    }
    grid
}

fn coord(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Display text for a JSON scalar; containers keep their JSON form.
fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => s!(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Like Python's `a or b`: the first key whose value is not null, false,
/// zero, or empty.
fn first_truthy<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| map.get(*k)).find(|v| match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_layout_with_named_sheets() {
        let v = json!({
            "clientVars": { "sheets": [
                { "name": "汇总", "rows": [["公司", "岗位"], ["甲", null], [1, true]] },
                { "title": "明细", "rows": [{ "cells": [{ "v": { "text": "乙" } }, { "value": "后端" }, "raw"] }] },
                { "rows": [] }
            ]}
        });
        let t = tables_from_json(&v);
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].name, "汇总");
        assert_eq!(t[0].rows, vec![vec!["公司", "岗位"], vec!["甲", ""], vec!["1", "true"]]);
        assert_eq!(t[1].name, "明细");
        assert_eq!(t[1].rows, vec![vec!["乙", "后端", "raw"]]);
    }

    #[test]
    fn sparse_celldata_fills_a_grid() {
        let v = json!({ "sheetList": [{ "celldata": [
            { "r": 0, "c": 0, "v": { "m": "公司" } },
            { "r": "2", "c": 1, "v": { "m": "丙" } },
            { "r": 1, "c": 0, "v": "纯文本" },
            { "r": "x", "c": 0, "v": { "m": "skip" } }
        ]}]});
        let t = tables_from_json(&v);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].name, "Sheet1");
        assert_eq!(t[0].rows, vec![vec!["公司", ""], vec!["纯文本", ""], vec!["", "丙"]]);
    }

    #[test]
    fn far_sparse_cell_keeps_rows_short() {
        let v = json!({ "sheetList": [{ "celldata": [
            { "r": 0, "c": 0, "v": { "m": "公司" } },
            { "r": 100_000, "c": 16_000, "v": { "m": "远" } }
        ]}]});
        let rows = &tables_from_json(&v)[0].rows;
        assert_eq!(rows.len(), 100_001);
        assert_eq!(rows[0], vec!["公司"]);
        assert!(rows[1].is_empty());
        assert_eq!(rows[100_000].len(), 16_001);
        assert_eq!(rows[100_000][16_000], "远");
    }

    #[test]
    fn wide_sparse_sheet_stops_at_the_cell_budget() {
        let cells: Vec<Value> = (0..130).map(|r| json!({ "r": r, "c": 16_000, "v": "x" })).collect();
        let v = json!({ "sheetList": [{ "celldata": cells }] });
        let rows = &tables_from_json(&v)[0].rows;
        assert_eq!(rows.len(), 130);
        assert_eq!(rows.iter().filter(|r| !r.is_empty()).count(), GRID_BUDGET / 16_001);
    }

    #[test]
    fn jsonp_wrapper_is_stripped() {
        let body = r#"clientVarsCallback && clientVarsCallback({"sheets":[{"name":"S","data":[["a"]]}]});"#;
        let t = parse_jsonp(body);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].rows, vec![vec!["a"]]);
        assert!(parse_jsonp("not jsonp").is_empty());
    }

    #[test]
    fn opendoc_urls_are_decoded_and_absolute() {
        let html = r#"<script src="//docs.qq.com/dop-api/opendoc?id=abc&amp;outformat=1"></script>
            <a href='https://docs.qq.com/dop-api/opendoc?id=abc&outformat=1'>x</a>"#;
        assert_eq!(opendoc_urls(html), vec!["https://docs.qq.com/dop-api/opendoc?id=abc&outformat=1"]);
    }

    #[test]
    fn basic_client_vars_blob_is_decoded() {
        let payload = r#"{"sheets":[{"name":"B","rows":[["x","y"]]}]}"#;
        let html = format!(
            r#"<script>window.basicClientVars = JSON.parse(decodeURIComponent(escape(atob("{}"))));</script>"#,
            STANDARD.encode(payload)
        );
        let t = from_basic_client_vars(&html);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].name, "B");
    }
}
