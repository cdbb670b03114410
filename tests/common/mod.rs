// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;

use oc_scrape::error::FetchError;
use oc_scrape::fetch::PageSource;

/// In-memory pages keyed by number; unknown pages fail with a 503.
#[derive(Default)]
pub struct FakeSite {
    pub pages: HashMap<u32, String>,
    pub calls: Vec<u32>,
}

impl FakeSite {
    /// `n` pages of two rows each, every page advertising `n` as the total.
    pub fn with_pages(n: u32) -> Self {
        let pages = (1..=n).map(|p| (p, listing_page(p, 2, n))).collect();
        Self { pages, calls: Vec::new() }
    }
}

impl PageSource for FakeSite {
    fn fetch(&mut self, page: u32) -> Result<String, FetchError> {
        self.calls.push(page);
        self.pages
            .get(&page)
            .cloned()
            .ok_or(FetchError::Status { url: format!("fake://{page}"), status: 503 })
    }
}

pub fn listing_page(page: u32, rows: u32, total: u32) -> String {
    let body: String = (1..=rows)
        .map(|r| {
            format!(
                r#"<tr><td><a href="/c/{page}-{r}">公司{page}-{r}</a></td><td>岗位{r}</td><td>2025/1/{r}</td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body>
<table class="table">
  <thead><tr><th>公司名称</th><th>岗位</th><th>更新日期</th></tr></thead>
  <tbody>{body}</tbody>
</table>
<ul class="pagination"><li><a href="?page=1">1</a></li><li><a href="?page={total}">{total}</a></li></ul>
</body></html>"#
    )
}
