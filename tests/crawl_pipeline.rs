// tests/crawl_pipeline.rs
mod common;

use std::time::Duration;

use common::{FakeSite, listing_page};
use oc_scrape::clean::sanitize_records;
use oc_scrape::config::CrawlOptions;
use oc_scrape::data::{Cell, Record};
use oc_scrape::error::{ConfigError, Error, ExportError, FetchError};
use oc_scrape::progress::Progress;
use oc_scrape::scrape::crawl;

fn opts(start: u32, end: Option<u32>) -> CrawlOptions {
    CrawlOptions { start_page: start, end_page: end, page_delay: Duration::ZERO, ..CrawlOptions::default() }
}

fn companies(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.get("公司名称").map(Cell::label).unwrap_or("")).collect()
}

#[test]
fn explicit_range_fetches_each_page_once_in_order() {
    let mut site = FakeSite::with_pages(5);
    let out = crawl(&mut site, &opts(2, Some(3)), None, None).unwrap();

    assert_eq!(site.calls, [2, 3]);
    assert_eq!(out.fetches, 2);
    assert_eq!(companies(&out.records), ["公司2-1", "公司2-2", "公司3-1", "公司3-2"]);
    assert!(out.is_complete());

    let clean = sanitize_records(out.records);
    assert_eq!(clean[0].get("更新日期").map(Cell::label), Some("2025-01-01"));
    assert_eq!(clean[0].get("公司名称").and_then(Cell::url), Some("https://www.givemeoc.com/c/2-1"));
}

#[test]
fn detected_range_reuses_first_page() {
    let mut site = FakeSite::with_pages(3);
    let out = crawl(&mut site, &opts(1, None), None, None).unwrap();

    assert_eq!(site.calls, [1, 2, 3]);
    assert_eq!(out.records.len(), 6);
    assert_eq!(out.range.map(|r| r.end()), Some(3));
}

#[test]
fn detected_range_from_a_later_start_fetches_each_page_once() {
    let mut site = FakeSite::with_pages(3);
    let out = crawl(&mut site, &opts(2, None), None, None).unwrap();

    let range = out.range.unwrap();
    assert_eq!((range.start(), range.end()), (2, 3));
    assert_eq!(site.calls, [2, 3]);
    assert_eq!(out.fetches, range.len());
    assert_eq!(companies(&out.records), ["公司2-1", "公司2-2", "公司3-1", "公司3-2"]);
}

#[test]
fn detection_failure_aborts() {
    let mut site = FakeSite::default();
    let err = crawl(&mut site, &opts(1, None), None, None).unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Status { status: 503, .. })));
}

#[test]
fn detected_total_below_start_is_a_range_error() {
    let mut site = FakeSite::with_pages(2);
    site.pages.insert(4, listing_page(4, 0, 2));
    let err = crawl(&mut site, &opts(4, None), None, None).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::PageRange { start: 4, end: 2 })));
}

#[test]
fn zero_row_and_unparseable_pages() {
    let mut site = FakeSite::with_pages(3);
    site.pages.insert(2, listing_page(2, 0, 3));
    site.pages.insert(3, "<html><body><p>维护中</p></body></html>".into());

    let mut progress = Counting::default();
    let out = crawl(&mut site, &opts(1, Some(3)), Some(&mut progress), None).unwrap();

    assert_eq!(out.records.len(), 2);
    assert_eq!(out.pages_done, [1, 2]);
    assert_eq!(out.skipped, [3]);
    assert_eq!((progress.total, progress.done, progress.skipped, progress.finished), (3, 2, 1, true));
}

#[test]
fn mid_crawl_failure_keeps_what_was_gathered() {
    let mut site = FakeSite::with_pages(2);
    let out = crawl(&mut site, &opts(1, Some(4)), None, None).unwrap();

    assert_eq!(site.calls, [1, 2, 3]);
    assert_eq!(out.records.len(), 4);
    let (page, err) = out.failure.as_ref().unwrap();
    assert_eq!(*page, 3);
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
}

#[test]
fn checkpoint_sees_growing_snapshots() {
    let mut site = FakeSite::with_pages(3);
    let mut sizes = Vec::new();
    let mut cp = |records: &[Record]| -> Result<(), ExportError> {
        sizes.push(records.len());
        Ok(())
    };
    crawl(&mut site, &opts(1, Some(3)), None, Some(&mut cp)).unwrap();
    assert_eq!(sizes, [2, 4, 6]);
}

#[derive(Default)]
struct Counting {
    total: usize,
    done: usize,
    skipped: usize,
    finished: bool,
}

impl Progress for Counting {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }
    fn page_done(&mut self, _page: u32, _rows: usize) {
        self.done += 1;
    }
    fn page_skipped(&mut self, _page: u32, _reason: &str) {
        self.skipped += 1;
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}
