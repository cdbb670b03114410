// src/bin/cli.rs
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use oc_scrape::cli::{self, Args, CliProgress, RunSummary};
use oc_scrape::config::file;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let file_cfg = file::load(args.config.as_deref()).wrap_err("loading settings")?;
    let opts = cli::resolve(&args, file_cfg)?;
    let _log_guard = oc_scrape::log::init(&opts.log)?;

    let mut progress = CliProgress::default();
    match cli::run(&opts, Some(&mut progress))? {
        RunSummary::Exported { path, records, pages, skipped } => {
            if !skipped.is_empty() {
                eprintln!("Skipped pages (could not parse): {skipped:?}");
            }
            println!("Saved {records} records from {pages} pages to {}", path.display());
        }
        RunSummary::Empty { pages, .. } => {
            eprintln!("No records found on {pages} pages; nothing written.");
        }
        RunSummary::Workbook { path } => {
            println!("Saved sheet to {}", path.display());
        }
    }
    Ok(())
}
