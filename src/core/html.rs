// src/core/html.rs
use scraper::{ElementRef, Selector};
use url::Url;

use super::sanitize::normalize_ws;
use crate::error::ParseError;

pub fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector { selector: s!(css), reason: e.to_string() })
}

/// Visible text of an element, whitespace-normalized.
pub fn text_of(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    normalize_ws(&raw)
}

/// Same as `text_of`, but line breaks inside the element survive as `\n`
/// so later cleanup can decide how to join them.
pub fn text_lines(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.lines()
        .map(normalize_ws)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `href` of the first anchor inside `el`, resolved against `base`.
/// Hrefs that are not web links (`javascript:`, `#`) are ignored.
pub fn first_href(el: ElementRef<'_>, base: &Url) -> Option<String> {
    let a = Selector::parse("a[href]").ok()?;
    let href = el.select(&a).next()?.value().attr("href")?.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Direct element children with one of the given tag names.
pub fn child_elements<'a>(el: ElementRef<'a>, tags: &'a [&'a str]) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |c| tags.contains(&c.value().name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn relative_hrefs_resolve_against_base() {
        let doc = Html::parse_fragment(r#"<div><a href="/job/42">看公告</a> <a href="x">b</a></div>"#);
        let div = doc.select(&selector("div").unwrap()).next().unwrap();
        let base = Url::parse("https://www.givemeoc.com/list?page=3").unwrap();
        assert_eq!(first_href(div, &base).as_deref(), Some("https://www.givemeoc.com/job/42"));
        assert_eq!(text_of(div), "看公告 b");
    }

    #[test]
    fn script_links_are_not_urls() {
        let doc = Html::parse_fragment(r#"<div><a href="javascript:void(0)">x</a></div>"#);
        let div = doc.select(&selector("div").unwrap()).next().unwrap();
        let base = Url::parse("https://www.givemeoc.com/").unwrap();
        assert_eq!(first_href(div, &base), None);
    }

    #[test]
    fn bad_selector_is_a_parse_error() {
        assert!(matches!(selector("table[["), Err(ParseError::Selector { .. })));
    }
}
