// src/config/file.rs
//
// Optional settings file (`oc_scrape.toml`) layered over `OC_SCRAPE__*`
// environment variables. Every key is optional; precedence is
// flags > file > environment > built-in defaults.
//
//   start_page = 1
//   format = "excel"
//   [site]
//   base_url = "https://www.givemeoc.com/"
//   [fetch]
//   page_delay_ms = 2000
//   [log]
//   level = "debug"

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use super::consts::{CONFIG_FILE, ENV_PREFIX};
use super::options::{Engine, ExportFormat};
use crate::error::ConfigError;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub output_name: Option<String>,
    pub format: Option<ExportFormat>,
    pub engine: Option<Engine>,
    pub headless: Option<bool>,
    pub all_in_one: Option<bool>,
    pub chrome_user_data_dir: Option<PathBuf>,
    pub chrome_profile_dir: Option<String>,
    pub site: SiteConfig,
    pub fetch: FetchConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: Option<String>,
    pub page_param: Option<String>,
    pub table_selector: Option<String>,
    pub pagination_selector: Option<String>,
    pub link_columns: Option<Vec<String>>,
    pub sheet_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub page_delay_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub table_wait_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

/// Load `path` (must exist) or, when `None`, `oc_scrape.toml` in the working
/// directory if present. File values override environment values.
pub fn load(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let file = match path {
        Some(p) => File::from(p).format(FileFormat::Toml).required(true),
        None => File::new(CONFIG_FILE, FileFormat::Toml).required(false),
    };

    let cfg = Config::builder()
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .add_source(file)
        .build()?;

    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_nested_tables() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            f,
            r#"
start_page = 2
format = "xlsx"
engine = "http"

[site]
link_columns = ["公司名称"]

[fetch]
page_delay_ms = 0
max_retries = 5
"#
        )
        .unwrap();

        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.start_page, Some(2));
        assert_eq!(cfg.format, Some(ExportFormat::Excel));
        assert_eq!(cfg.engine, Some(Engine::Http));
        assert_eq!(cfg.site.link_columns, Some(vec![s!("公司名称")]));
        assert_eq!(cfg.fetch.page_delay_ms, Some(0));
        assert_eq!(cfg.fetch.max_retries, Some(5));
        assert_eq!(cfg.log, LogConfig::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(load(Some(&missing)), Err(ConfigError::Load(_))));
    }
}
