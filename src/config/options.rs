// src/config/options.rs
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;
use crate::core::net::RetryPolicy;
use crate::data::LinkColumn;
use crate::error::ConfigError;
use crate::specs::ListingSpec;

/// Everything one run needs, resolved from flags + config file + defaults.
#[derive(Clone, Debug, Default)]
pub struct AppOptions {
    pub crawl: CrawlOptions,
    pub session: SessionOptions,
    pub export: ExportOptions,
    pub log: LogOptions,
    /// Download this read-only Tencent Docs sheet instead of crawling.
    pub tencent_doc: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    #[serde(alias = "xlsx")]
    #[cfg_attr(feature = "cli", value(alias = "xlsx"))]
    Excel,
    Json,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    /// CSV and JSON have no hyperlink cells; URLs go in their own column.
    pub fn splits_links(&self) -> bool {
        !matches!(self, ExportFormat::Excel)
    }
}

/// How pages are fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Render each page in Chrome (pages built by JavaScript).
    #[default]
    Browser,
    /// Plain HTTP GET with the session's cookies.
    Http,
}

/// 1-based, inclusive page range. Always `1 <= start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self, ConfigError> {
        if start == 0 || end == 0 {
            return Err(ConfigError::ZeroPage);
        }
        if start > end {
            return Err(ConfigError::PageRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 { self.start }
    pub fn end(&self) -> u32 { self.end }
    pub fn len(&self) -> usize { (self.end - self.start + 1) as usize }
    pub fn pages(&self) -> RangeInclusive<u32> { self.start..=self.end }
}

#[derive(Clone, Debug)]
pub struct CrawlOptions {
    pub start_page: u32,
    /// `None` → detect the total from the start page.
    pub end_page: Option<u32>,
    /// Pause between two page requests.
    pub page_delay: Duration,
    /// Re-export the accumulated records after every page.
    pub all_in_one: bool,
    pub retry: RetryPolicy,
    pub site: ListingSpec,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: None,
            page_delay: Duration::from_millis(PAGE_DELAY_MS),
            all_in_one: false,
            retry: RetryPolicy::default(),
            site: ListingSpec::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    pub engine: Engine,
    pub headless: bool,
    /// Chrome user-data directory to reuse (inherits its login cookies).
    pub chrome_user_data_dir: Option<PathBuf>,
    /// Profile inside the user-data directory, e.g. "Default" or "Profile 1".
    pub chrome_profile_dir: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    /// How long the browser waits for the listing table to appear.
    pub table_wait: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            headless: true,
            chrome_user_data_dir: None,
            chrome_profile_dir: None,
            user_agent: s!(USER_AGENT),
            timeout: Duration::from_secs(TIMEOUT_SECS),
            table_wait: Duration::from_secs(TABLE_WAIT_SECS),
        }
    }
}

impl SessionOptions {
    pub fn reuses_profile(&self) -> bool {
        self.chrome_user_data_dir.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub output_dir: PathBuf,
    /// File name, with or without extension; the format's extension is
    /// appended when missing.
    pub output_name: String,
    pub links: Vec<LinkColumn>,
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            output_dir: PathBuf::from(DEFAULT_OUT_DIR),
            output_name: Self::default_output_name(),
            links: DEFAULT_LINK_COLUMNS.iter().map(|c| LinkColumn::new(*c)).collect(),
            sheet_name: s!(SHEET_NAME),
        }
    }
}

impl ExportOptions {
    /// `givemeoc_data_<YYYYmmdd_HHMMSS>`
    pub fn default_output_name() -> String {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("{DEFAULT_FILE_PREFIX}_{stamp}")
    }

    /// `<output_dir>/<output_name>.<ext>`
    pub fn out_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name())
    }

    pub fn file_name(&self) -> String {
        let ext = self.format.ext();
        let name = self.output_name.trim();
        let has_ext = name
            .rsplit_once('.')
            .is_some_and(|(stem, e)| !stem.is_empty() && e.eq_ignore_ascii_case(ext));
        if has_ext { s!(name) } else { format!("{name}.{ext}") }
    }

    pub fn set_link_columns<S: AsRef<str>>(&mut self, columns: &[S]) {
        self.links = columns.iter().map(|c| LinkColumn::new(c.as_ref())).collect();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogOptions {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { level: s!(LOG_LEVEL), file: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_path_appends_extension_only_when_missing() {
        let mut export = ExportOptions {
            output_dir: PathBuf::from("out"),
            output_name: s!("jobs"),
            ..ExportOptions::default()
        };
        assert_eq!(export.out_path(), PathBuf::from("out").join("jobs.csv"));

        export.format = ExportFormat::Excel;
        assert_eq!(export.file_name(), "jobs.xlsx");

        export.output_name = s!("jobs.XLSX");
        assert_eq!(export.file_name(), "jobs.XLSX");

        export.output_name = s!("jobs.csv");
        assert_eq!(export.file_name(), "jobs.csv.xlsx");
    }

    #[test]
    fn page_range_rejects_inverted_and_zero() {
        assert!(matches!(PageRange::new(3, 2), Err(ConfigError::PageRange { start: 3, end: 2 })));
        assert!(matches!(PageRange::new(0, 2), Err(ConfigError::ZeroPage)));
        let r = PageRange::new(2, 3).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.pages().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn default_link_columns_get_url_headers() {
        let export = ExportOptions::default();
        assert_eq!(export.links[0].column, "公司名称");
        assert_eq!(export.links[0].url_header, "公司名称链接");
    }
}
