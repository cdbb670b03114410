// src/config/mod.rs
pub mod consts;
pub mod file;
pub mod options;

pub use file::FileConfig;
pub use options::{AppOptions, CrawlOptions, Engine, ExportFormat, ExportOptions, LogOptions, PageRange, SessionOptions};
