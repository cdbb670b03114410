// src/scrape.rs
//
// The crawl loop: optional page-count detection, then one page at a time
// (fetch → extract → append), with a polite pause between requests.

use std::thread;

use tracing::{info, warn};

use crate::config::{CrawlOptions, PageRange};
use crate::data::Record;
use crate::error::{Error, ExportError, FetchError};
use crate::fetch::PageSource;
use crate::progress::Progress;
use crate::specs::{listing, pagination};

/// Called with all records so far after each parsed page.
pub type Checkpoint<'a> = &'a mut dyn FnMut(&[Record]) -> Result<(), ExportError>;

#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Extracted (not yet sanitized) records, page then row order.
    pub records: Vec<Record>,
    pub range: Option<PageRange>,
    pub pages_done: Vec<u32>,
    /// Pages whose markup could not be parsed.
    pub skipped: Vec<u32>,
    /// Page fetches made, including the detection fetch.
    pub fetches: usize,
    /// Set when a fetch failed mid-crawl; the loop stopped at that page.
    pub failure: Option<(u32, FetchError)>,
}

impl CrawlOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Crawl `opts.start_page..=end`.
///
/// `end` is `opts.end_page`, or the count detected on the start page when
/// unset; that markup is reused for the start page, so every page in the
/// range is fetched exactly once. A fetch failure during detection is
/// returned as an error. A fetch
/// failure inside the loop ends the crawl and is reported through
/// `CrawlOutcome::failure` together with what was gathered so far.
pub fn crawl(
    source: &mut dyn PageSource,
    opts: &CrawlOptions,
    mut progress: Option<&mut dyn Progress>,
    mut checkpoint: Option<Checkpoint<'_>>,
) -> Result<CrawlOutcome, Error> {
    let mut out = CrawlOutcome::default();
    let mut first_page: Option<String> = None;
    let start = opts.start_page;

    let end = match opts.end_page {
        Some(end) => end,
        None => {
            if let Some(p) = progress.as_deref_mut() {
                p.log("Detecting page count…");
            }
            let markup = source.fetch(start)?;
            out.fetches += 1;
            let total = pagination::detect_total_pages(&markup, &opts.site);
            info!(total, "page count detected");
            first_page = Some(markup);
            total
        }
    };

    let range = PageRange::new(start, end)?;
    out.range = Some(range);
    info!(start = range.start(), end = range.end(), "crawling");

    if let Some(p) = progress.as_deref_mut() {
        p.begin(range.len());
    }

    for page in range.pages() {
        let reused = if page == start { first_page.take() } else { None };
        let markup = match reused {
            Some(m) => m,
            None => {
                if out.fetches > 0 && !opts.page_delay.is_zero() {
                    thread::sleep(opts.page_delay);
                }
                out.fetches += 1;
                match source.fetch(page) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!(page, error = %e, "fetch failed, stopping crawl");
                        if let Some(p) = progress.as_deref_mut() {
                            p.log(&format!("Page {page}: {e}"));
                        }
                        out.failure = Some((page, e));
                        break;
                    }
                }
            }
        };

        match listing::extract_rows(&markup, &opts.site) {
            Ok(rows) => {
                info!(page, rows = rows.len(), "page parsed");
                if let Some(p) = progress.as_deref_mut() {
                    p.page_done(page, rows.len());
                }
                out.records.extend(rows);
                out.pages_done.push(page);
                if let Some(cp) = checkpoint.as_deref_mut() {
                    cp(&out.records)?;
                }
            }
            Err(e) => {
                warn!(page, error = %e, "page skipped");
                if let Some(p) = progress.as_deref_mut() {
                    p.page_skipped(page, &e.to_string());
                }
                out.skipped.push(page);
            }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    Ok(out)
}
