// src/specs/mod.rs
//! # Listing page specs
//!
//! Everything that knows **where the data lives in the listing page's HTML**.
//!
//! ## What lives here
//! - `ListingSpec`: site coordinates (base URL, page query parameter, table and
//!   pagination selectors, link columns). Built once from config; read-only.
//! - `listing`: header discovery and row extraction from one page's markup.
//! - `pagination`: total page count from a listing page's markup.
//!
//! ## What does **not** live here
//! - Fetching, retries and browser sessions (`fetch`, `core::net`, `core::browser`).
//! - Cleanup of extracted values (`clean`) and export formatting.
//!
//! ## Conventions
//! - Pure functions of `(markup, spec)`; testable offline against inline HTML.
//! - Header names are re-derived for every page; nothing assumes two pages
//!   share a column set.
//! - Logging only where a fallback is taken (e.g. page count defaulting to 1).

pub mod listing;
pub mod pagination;

use std::sync::LazyLock;

use url::Url;

use crate::config::consts::*;
use crate::error::ConfigError;

static SITE_URL: LazyLock<Url> = LazyLock::new(|| Url::parse(BASE_URL).expect("static URL"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingSpec {
    pub base_url: Url,
    /// Query parameter carrying the 1-based page number.
    pub page_param: String,
    pub table_selector: String,
    pub pagination_selector: String,
    /// Columns whose first anchor becomes a hyperlink cell.
    pub link_columns: Vec<String>,
}

impl Default for ListingSpec {
    fn default() -> Self {
        Self {
            base_url: SITE_URL.clone(),
            page_param: s!(PAGE_PARAM),
            table_selector: s!(TABLE_SELECTOR),
            pagination_selector: s!(PAGINATION_SELECTOR),
            link_columns: DEFAULT_LINK_COLUMNS.iter().map(|c| s!(*c)).collect(),
        }
    }
}

impl ListingSpec {
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.base_url = Url::parse(url).map_err(|source| ConfigError::Url { url: s!(url), source })?;
        Ok(self)
    }

    /// `base_url` with `page_param=<page>` set; other query pairs are kept.
    pub fn page_url(&self, page: u32) -> String {
        let mut url = self.base_url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != self.page_param.as_str())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(&self.page_param, &page.to_string());
        url.to_string()
    }

    pub fn is_link_column(&self, name: &str) -> bool {
        self.link_columns.iter().any(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_sets_param_and_keeps_others() {
        let spec = ListingSpec::default().with_base_url("https://example.com/jobs?kind=campus&page=9").unwrap();
        assert_eq!(spec.page_url(3), "https://example.com/jobs?kind=campus&page=3");
        assert_eq!(ListingSpec::default().page_url(1), "https://www.givemeoc.com/?page=1");
    }

    #[test]
    fn bad_base_url_is_config_error() {
        assert!(matches!(
            ListingSpec::default().with_base_url("not a url"),
            Err(ConfigError::Url { .. })
        ));
    }

    #[test]
    fn default_points_at_the_site_root() {
        let spec = ListingSpec::default();
        assert_eq!(spec.base_url.as_str(), BASE_URL);
        assert_eq!(spec.page_url(2), "https://www.givemeoc.com/?page=2");
    }
}
