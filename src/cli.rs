// src/cli.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::clean::sanitize_records;
use crate::config::consts::{DEFAULT_FILE_PREFIX, DEFAULT_OUT_DIR};
use crate::config::{AppOptions, CrawlOptions, Engine, ExportFormat, ExportOptions, FileConfig, PageRange};
use crate::core::net::RetryPolicy;
use crate::core::sanitize::sanitize_file_stem;
use crate::data::Record;
use crate::error::{ConfigError, Error, ExportError};
use crate::fetch::{PageFetcher, PageSource, SessionContext};
use crate::progress::Progress;
use crate::scrape::{self, Checkpoint};
use crate::{file, tencent};

/// Crawl the GiveMeOC campus-recruiting listing and export it.
#[derive(Debug, Default, Parser)]
#[command(name = "oc_scrape", version, about)]
pub struct Args {
    /// First page to crawl (1-based)
    #[arg(short = 's', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub start_page: Option<u32>,

    /// Last page to crawl; detected from the start page when omitted
    #[arg(short = 'e', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub end_page: Option<u32>,

    /// Output file name (extension optional)
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    #[arg(short = 'f', long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Output directory, created when missing
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Run Chrome without a window (default)
    #[arg(long, overrides_with = "no_headless")]
    pub headless: bool,

    /// Show the Chrome window
    #[arg(long, overrides_with = "headless")]
    pub no_headless: bool,

    /// Settings file (TOML); defaults to ./oc_scrape.toml when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chrome user-data directory of a logged-in profile
    #[arg(long)]
    pub chrome_user_data_dir: Option<PathBuf>,

    /// Profile inside the user-data directory, e.g. "Default"
    #[arg(long)]
    pub chrome_profile_dir: Option<String>,

    /// Download this read-only Tencent Docs sheet to XLSX instead of crawling
    #[arg(long, value_name = "URL")]
    pub tencent_doc: Option<String>,

    /// Rewrite the output file after every page
    #[arg(long)]
    pub all_in_one: bool,

    #[arg(long, value_enum)]
    pub engine: Option<Engine>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn headless(&self) -> Option<bool> {
        match (self.headless, self.no_headless) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Merge flags over the settings file over built-in defaults.
pub fn resolve(args: &Args, file: FileConfig) -> Result<AppOptions, Error> {
    let mut opts = AppOptions::default();

    // crawl
    let crawl = &mut opts.crawl;
    crawl.start_page = args.start_page.or(file.start_page).unwrap_or(1);
    crawl.end_page = args.end_page.or(file.end_page);
    if crawl.start_page == 0 || crawl.end_page == Some(0) {
        return Err(ConfigError::ZeroPage.into());
    }
    if let Some(end) = crawl.end_page {
        PageRange::new(crawl.start_page, end)?;
    }
    crawl.all_in_one = args.all_in_one || file.all_in_one.unwrap_or(false);
    if let Some(ms) = file.fetch.page_delay_ms {
        crawl.page_delay = Duration::from_millis(ms);
    }
    crawl.retry = RetryPolicy {
        max_retries: file.fetch.max_retries.unwrap_or(crawl.retry.max_retries),
        delay: file.fetch.retry_delay_ms.map(Duration::from_millis).unwrap_or(crawl.retry.delay),
    };

    let site = &file.site;
    if let Some(url) = &site.base_url {
        crawl.site = crawl.site.clone().with_base_url(url)?;
    }
    if let Some(p) = &site.page_param {
        crawl.site.page_param = p.clone();
    }
    if let Some(sel) = &site.table_selector {
        crawl.site.table_selector = sel.clone();
    }
    if let Some(sel) = &site.pagination_selector {
        crawl.site.pagination_selector = sel.clone();
    }
    if let Some(cols) = &site.link_columns {
        crawl.site.link_columns = cols.clone();
        opts.export.set_link_columns(cols);
    }

    // session
    let session = &mut opts.session;
    session.engine = args.engine.or(file.engine).unwrap_or_default();
    session.headless = args.headless().or(file.headless).unwrap_or(true);
    session.chrome_user_data_dir = args
        .chrome_user_data_dir
        .clone()
        .or(file.chrome_user_data_dir)
        .map(|p| expand_home(&p));
    session.chrome_profile_dir = args.chrome_profile_dir.clone().or(file.chrome_profile_dir);
    if let Some(ua) = file.fetch.user_agent {
        session.user_agent = ua;
    }
    if let Some(secs) = file.fetch.timeout_secs {
        session.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.fetch.table_wait_secs {
        session.table_wait = Duration::from_secs(secs);
    }

    // export
    let export = &mut opts.export;
    export.format = args.format.or(file.format).unwrap_or(ExportFormat::Csv);
    export.output_dir = args
        .output_dir
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
    if let Some(name) = args.output.clone().or(file.output_name).filter(|n| !n.trim().is_empty()) {
        export.output_name = name;
    }
    if let Some(sheet) = file.site.sheet_name {
        export.sheet_name = sheet;
    }

    // log
    if let Some(level) = file.log.level {
        opts.log.level = level;
    }
    opts.log.file = args.log_file.clone().or(file.log.file);

    opts.tencent_doc = args.tencent_doc.clone();
    Ok(opts)
}

/// `~/x` → `$HOME/x`
fn expand_home(p: &Path) -> PathBuf {
    let Ok(rest) = p.strip_prefix("~") else { return p.to_path_buf() };
    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => p.to_path_buf(),
    }
}

/// What a run produced.
#[derive(Debug)]
pub enum RunSummary {
    Exported { path: PathBuf, records: usize, pages: usize, skipped: Vec<u32> },
    /// Nothing was extracted; no file was written.
    Empty { pages: usize, skipped: Vec<u32> },
    Workbook { path: PathBuf },
}

pub fn run(opts: &AppOptions, progress: Option<&mut dyn Progress>) -> Result<RunSummary, Error> {
    if let Some(doc) = &opts.tencent_doc {
        let path = tencent::download(doc, &workbook_path(&opts.export), &opts.session, opts.crawl.retry)?;
        return Ok(RunSummary::Workbook { path });
    }

    let session = SessionContext::open(&opts.session, &opts.crawl.site.base_url)?;
    let mut fetcher = PageFetcher::new(&session, &opts.crawl.site, opts.crawl.retry);
    run_crawl(&mut fetcher, &opts.crawl, &opts.export, progress)
}

/// Crawl `source`, sanitize, and export.
///
/// With `all_in_one`, every parsed page rewrites the output file with all
/// records so far. Records gathered before a mid-crawl fetch failure are
/// still exported, and the failure comes back as `Error::Incomplete`.
pub fn run_crawl(
    source: &mut dyn PageSource,
    crawl: &CrawlOptions,
    export: &ExportOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, Error> {
    let mut snapshot = |records: &[Record]| -> Result<(), ExportError> {
        if records.is_empty() {
            return Ok(());
        }
        file::export_records(export, &sanitize_records(records.to_vec())).map(|_| ())
    };
    let checkpoint: Option<Checkpoint<'_>> = if crawl.all_in_one { Some(&mut snapshot) } else { None };

    let outcome = scrape::crawl(source, crawl, progress, checkpoint)?;
    let pages = outcome.pages_done.len();
    let skipped = outcome.skipped;
    let records = sanitize_records(outcome.records);

    if records.is_empty() {
        if let Some((_, e)) = outcome.failure {
            return Err(e.into());
        }
        warn!(skipped = skipped.len(), "no records extracted, nothing written");
        return Ok(RunSummary::Empty { pages, skipped });
    }

    let path = file::export_records(export, &records)?;
    if let Some((page, source)) = outcome.failure {
        return Err(Error::Incomplete { page, records: records.len(), path, source });
    }
    info!(records = records.len(), pages, "done");
    Ok(RunSummary::Exported { path, records: records.len(), pages, skipped })
}

/// `<output-dir>/<stem>.xlsx`, with the stem made file-name safe.
fn workbook_path(export: &ExportOptions) -> PathBuf {
    let name = export.output_name.trim();
    let stem = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.eq_ignore_ascii_case("xlsx") => stem,
        _ => name,
    };
    let mut export = export.clone();
    export.format = ExportFormat::Excel;
    export.output_name = sanitize_file_stem(stem, DEFAULT_FILE_PREFIX);
    export.out_path()
}

/// Progress bar on stderr over the page loop.
pub struct CliProgress {
    bar: ProgressBar,
}

impl Default for CliProgress {
    fn default() -> Self {
        Self { bar: ProgressBar::hidden() }
    }
}

impl Progress for CliProgress {
    fn begin(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} pages {msg}") {
            bar.set_style(style.progress_chars("=> "));
        }
        self.bar = bar;
    }

    fn log(&mut self, msg: &str) {
        self.bar.println(msg);
    }

    fn page_done(&mut self, page: u32, rows: usize) {
        self.bar.set_message(format!("p{page}: {rows} rows"));
        self.bar.inc(1);
    }

    fn page_skipped(&mut self, page: u32, _reason: &str) {
        self.bar.set_message(format!("p{page}: skipped"));
        self.bar.inc(1);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags_and_xlsx_alias() {
        let args = Args::try_parse_from(["oc_scrape", "-s", "2", "-e", "5", "-f", "xlsx", "-o", "jobs", "--no-headless"])
            .unwrap();
        assert_eq!(args.start_page, Some(2));
        assert_eq!(args.end_page, Some(5));
        assert_eq!(args.format, Some(ExportFormat::Excel));
        assert_eq!(args.headless(), Some(false));

        let opts = resolve(&args, FileConfig::default()).unwrap();
        assert_eq!(opts.export.file_name(), "jobs.xlsx");
        assert!(!opts.session.headless);
    }

    #[test]
    fn page_zero_is_rejected_by_the_parser() {
        assert!(Args::try_parse_from(["oc_scrape", "-s", "0"]).is_err());
    }

    #[test]
    fn inverted_range_is_a_config_error() {
        let args = Args { start_page: Some(4), end_page: Some(2), ..Args::default() };
        assert!(matches!(
            resolve(&args, FileConfig::default()),
            Err(Error::Config(ConfigError::PageRange { start: 4, end: 2 }))
        ));
    }

    #[test]
    fn workbook_name_is_file_safe() {
        let export = ExportOptions {
            output_dir: PathBuf::from("out"),
            output_name: s!("秋招/汇总: 2025.XLSX"),
            ..ExportOptions::default()
        };
        assert_eq!(workbook_path(&export), PathBuf::from("out").join("秋招_汇总_2025.xlsx"));

        let blank = ExportOptions { output_name: s!("//"), ..export };
        assert_eq!(workbook_path(&blank), PathBuf::from("out").join("givemeoc_data.xlsx"));
    }

    #[test]
    fn home_is_expanded() {
        let Some(home) = std::env::var_os("HOME") else { return };
        assert_eq!(expand_home(Path::new("~/chrome")), PathBuf::from(home).join("chrome"));
        assert_eq!(expand_home(Path::new("/abs")), PathBuf::from("/abs"));
    }
}
