// src/specs/pagination.rs
//
// Total page count from the first listing page. Tried in order:
//   1. data-total-pages / data-pages / data-total on the pagination element
//   2. largest number among its <li>/<a> labels and `page=` values in its hrefs
//   3. "共 N 页" anywhere in the page text
// Falls back to 1.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};
use url::Url;

use super::ListingSpec;
use crate::core::html::{selector, text_of};

const COUNT_ATTRS: &[&str] = &["data-total-pages", "data-pages", "data-total"];

static TOTAL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"共\s*(\d+)\s*页").expect("static regex"));

pub fn detect_total_pages(markup: &str, spec: &ListingSpec) -> u32 {
    let doc = Html::parse_document(markup);

    let pagination = selector(&spec.pagination_selector)
        .ok()
        .and_then(|sel| doc.select(&sel).next());

    if let Some(nav) = pagination {
        if let Some(n) = from_attributes(nav) {
            debug!(pages = n, "page count from pagination attribute");
            return n;
        }
        if let Some(n) = from_items(nav, spec) {
            debug!(pages = n, "page count from pagination items");
            return n;
        }
    }

    let text: String = doc.root_element().text().collect();
    if let Some(n) = TOTAL_MARKER
        .captures(&text)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|n| *n >= 1)
    {
        debug!(pages = n, "page count from text marker");
        return n;
    }

    warn!(selector = %spec.pagination_selector, "could not detect page count, assuming 1");
    1
}

fn from_attributes(nav: ElementRef<'_>) -> Option<u32> {
    COUNT_ATTRS
        .iter()
        .filter_map(|a| nav.value().attr(a))
        .filter_map(|v| v.trim().parse::<u32>().ok())
        .find(|n| *n >= 1)
}

fn from_items(nav: ElementRef<'_>, spec: &ListingSpec) -> Option<u32> {
    let items = selector("li, a").ok()?;
    let mut best: Option<u32> = None;

    for el in nav.select(&items) {
        let label = text_of(el).parse::<u32>().ok();
        let href = el
            .value()
            .attr("href")
            .and_then(|h| page_in_href(h, &spec.base_url, &spec.page_param));
        for n in [label, href].into_iter().flatten() {
            best = Some(best.map_or(n, |b| b.max(n)));
        }
    }
    best.filter(|n| *n >= 1)
}

fn page_in_href(href: &str, base: &Url, param: &str) -> Option<u32> {
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == param)
        .and_then(|(_, v)| v.trim().parse().ok())
}
