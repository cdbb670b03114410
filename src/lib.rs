// src/lib.rs
//! Crawl the GiveMeOC campus-recruiting listing page by page, clean the rows
//! and export them as CSV, JSON or Excel. Also downloads read-only Tencent
//! Docs sheets to Excel.

#[macro_use]
pub mod macros;

pub mod config;
pub mod core;
pub mod error;
pub mod specs;

pub mod clean;
pub mod data;
pub mod fetch;
pub mod progress;
pub mod scrape;

pub mod csv;
pub mod file;
pub mod json;
pub mod xlsx;

pub mod log;
pub mod tencent;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
