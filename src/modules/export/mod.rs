//! Export
//!
//! `e` on a table page writes every filtered row, in the current sort
//! order and across all pages, to `<data_dir>/exports/<name>-<timestamp>.csv`.

mod csv_export;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::domain::table::TableView;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,

    #[error("failed to create export directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Create the export directory if needed
fn get_export_dir(base: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(base)?;
    Ok(base.to_path_buf())
}

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

/// Export the table's filtered, sorted rows. Returns the file written and
/// the number of rows in it.
pub fn export_table(view: &TableView, base: &Path, prefix: &str) -> Result<(PathBuf, usize), ExportError> {
    if view.processed().filtered_count() == 0 {
        return Err(ExportError::Empty);
    }
    let dir = get_export_dir(base)?;
    let path = dir.join(generate_filename(prefix, "csv"));
    let count = csv_export::write_rows(&path, view.columns(), view.ordered_rows())?;
    tracing::info!(path = %path.display(), rows = count, "exported table");
    Ok((path, count))
}
