// src/error.rs
//! Error taxonomy for the crawl pipeline.
//!
//! - `FetchError`: network / browser failures, classified by `is_retryable`.
//! - `ParseError`: expected page or payload structure absent.
//! - `ExportError`: writing the output artifact failed (always names the path).
//! - `ConfigError`: config file, flag values or site settings are unusable.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    /// 401/403: the session is not logged in; retrying will not help.
    #[error("{url} refused the session (HTTP {status}); log in with the Chrome profile and pass --chrome-user-data-dir")]
    Auth { url: String, status: u16 },

    #[error("could not start Chrome: {0}")]
    Launch(String),

    #[error("browser failed on {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    pub fn http(url: &str, source: reqwest::Error) -> Self {
        Self::Http { url: s!(url), source }
    }

    pub fn navigation(url: &str, reason: impl ToString) -> Self {
        Self::Navigation { url: s!(url), reason: reason.to_string() }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http { source, .. } => {
                source.is_timeout()
                    || source.is_connect()
                    || source.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            FetchError::Navigation { .. } => true,
            FetchError::Auth { .. } | FetchError::Launch(_) | FetchError::Exhausted { .. } => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no element matches table selector `{selector}`")]
    TableMissing { selector: String },

    #[error("table `{selector}` has no header row")]
    HeaderMissing { selector: String },

    #[error("invalid CSS selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("no sheet data could be extracted from {url}")]
    NoTables { url: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("output path {} exists but is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid URL `{url}`: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("start page {start} is after end page {end}")]
    PageRange { start: u32, end: u32 },

    #[error("page numbers start at 1")]
    ZeroPage,

    #[error("cannot set up logging: {0}")]
    Logging(String),
}

/// Crate-level error returned by the CLI entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A fetch failed mid-crawl; the records gathered so far were exported first.
    #[error("crawl stopped at page {page}; {records} records up to that point were saved to {}", .path.display())]
    Incomplete {
        page: u32,
        records: usize,
        path: PathBuf,
        #[source]
        source: FetchError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
