// src/config/consts.rs

// Site
pub const BASE_URL: &str = "https://www.givemeoc.com/";
pub const PAGE_PARAM: &str = "page";
pub const TABLE_SELECTOR: &str = "table.table";
pub const PAGINATION_SELECTOR: &str = ".pagination";
pub const DEFAULT_LINK_COLUMNS: &[&str] = &["公司名称", "招聘公告"];
pub const LINK_URL_SUFFIX: &str = "链接";

// Sanitizer rules
pub const SINGLE_LINE_COLUMNS: &[&str] = &["公司名称"];
pub const DATE_COLUMN_MARKERS: &[&str] = &["日期", "时间"];

// Fetch
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";
pub const TIMEOUT_SECS: u64 = 30;
pub const TABLE_WAIT_SECS: u64 = 10;
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY_MS: u64 = 2_000;
pub const PAGE_DELAY_MS: u64 = 2_000; // be polite

// Export
pub const DEFAULT_OUT_DIR: &str = "data";
pub const DEFAULT_FILE_PREFIX: &str = "givemeoc_data";
pub const SHEET_NAME: &str = "招聘信息";

// Config sources
pub const CONFIG_FILE: &str = "oc_scrape.toml";
pub const ENV_PREFIX: &str = "OC_SCRAPE";
pub const LOG_LEVEL: &str = "info";
