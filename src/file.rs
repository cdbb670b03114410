// src/file.rs

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::info;

use crate::config::{ExportFormat, ExportOptions};
use crate::data::{Record, SheetTable};
use crate::error::ExportError;

/// Write `records` to `export.out_path()` in the configured format.
/// Returns the final path written to.
pub fn export_records(export: &ExportOptions, records: &[Record]) -> Result<PathBuf, ExportError> {
    let path = export.out_path();
    let encode = |reason: String| ExportError::Encode { path: path.clone(), reason };

    let bytes = match export.format {
        ExportFormat::Csv => crate::csv::to_bytes(records, &export.links).map_err(|e| encode(e.to_string()))?,
        ExportFormat::Json => crate::json::to_bytes(records, &export.links).map_err(|e| encode(e.to_string()))?,
        ExportFormat::Excel => {
            crate::xlsx::records_to_bytes(records, &export.sheet_name).map_err(|e| encode(e.to_string()))?
        }
    };

    write_atomic(&path, &bytes)?;
    info!(path = %path.display(), records = records.len(), "exported");
    Ok(path)
}

/// Write a multi-sheet workbook to `path`.
pub fn export_sheets(path: &Path, tables: &[SheetTable]) -> Result<PathBuf, ExportError> {
    let bytes = crate::xlsx::sheets_to_bytes(tables)
        .map_err(|e| ExportError::Encode { path: path.to_path_buf(), reason: e.to_string() })?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), sheets = tables.len(), "workbook saved");
    Ok(path.to_path_buf())
}

/// Replace `path` with `bytes` in one step: the data goes to a temp file in
/// the same directory which is then renamed over the target.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_directory(dir)?;

    let write_err = |source: std::io::Error| ExportError::Write { path: path.to_path_buf(), source };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

pub fn ensure_directory(path: &Path) -> Result<(), ExportError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(ExportError::NotADirectory { path: path.to_path_buf() });
        }
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| ExportError::CreateDir { path: path.to_path_buf(), source })
}
