// tests/config_merge.rs
#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use oc_scrape::cli::{Args, resolve};
use oc_scrape::config::{Engine, ExportFormat, file};

fn settings(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    f.write_all(body.as_bytes()).unwrap();
    f
}

const SETTINGS: &str = r#"
start_page = 3
end_page = 9
format = "json"
engine = "http"
headless = false
output_dir = "from_file"

[site]
base_url = "https://mirror.example.com/list"
link_columns = ["公司名称"]
sheet_name = "校招"

[fetch]
page_delay_ms = 500
max_retries = 1
retry_delay_ms = 10

[log]
level = "debug"
"#;

#[test]
fn file_values_apply_when_flags_are_absent() {
    let f = settings(SETTINGS);
    let args = Args::try_parse_from(["oc_scrape"]).unwrap();
    let opts = resolve(&args, file::load(Some(f.path())).unwrap()).unwrap();

    assert_eq!(opts.crawl.start_page, 3);
    assert_eq!(opts.crawl.end_page, Some(9));
    assert_eq!(opts.crawl.page_delay, Duration::from_millis(500));
    assert_eq!(opts.crawl.retry.max_retries, 1);
    assert_eq!(opts.crawl.site.page_url(2), "https://mirror.example.com/list?page=2");
    assert_eq!(opts.session.engine, Engine::Http);
    assert!(!opts.session.headless);
    assert_eq!(opts.export.format, ExportFormat::Json);
    assert_eq!(opts.export.output_dir, PathBuf::from("from_file"));
    assert_eq!(opts.export.sheet_name, "校招");
    assert_eq!(opts.export.links.len(), 1);
    assert_eq!(opts.log.level, "debug");
}

#[test]
fn flags_override_file_values() {
    let f = settings(SETTINGS);
    let args = Args::try_parse_from([
        "oc_scrape", "-s", "1", "-e", "2", "-f", "csv", "--engine", "browser", "--headless", "-d", "cli_dir", "-o",
        "mine.csv",
    ])
    .unwrap();
    let opts = resolve(&args, file::load(Some(f.path())).unwrap()).unwrap();

    assert_eq!((opts.crawl.start_page, opts.crawl.end_page), (1, Some(2)));
    assert_eq!(opts.export.format, ExportFormat::Csv);
    assert_eq!(opts.session.engine, Engine::Browser);
    assert!(opts.session.headless);
    assert_eq!(opts.export.out_path(), PathBuf::from("cli_dir").join("mine.csv"));
}

#[test]
fn defaults_without_any_settings() {
    let args = Args::try_parse_from(["oc_scrape"]).unwrap();
    let opts = resolve(&args, Default::default()).unwrap();

    assert_eq!(opts.crawl.start_page, 1);
    assert_eq!(opts.crawl.end_page, None);
    assert_eq!(opts.export.format, ExportFormat::Csv);
    assert!(opts.session.headless);
    assert!(opts.export.output_name.starts_with("givemeoc_data_"));
    assert_eq!(opts.export.output_dir, PathBuf::from("data"));
}
