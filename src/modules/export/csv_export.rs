//! CSV Export
//!
//! Writes table rows to CSV, one column per visible table column.

use std::path::Path;

use serde_json::Value;

use super::ExportError;
use crate::domain::rows::{stringify, Row};
use crate::domain::table::Column;

/// Write rows to CSV file
pub fn write_rows<'a>(
    path: &Path,
    columns: &[Column],
    rows: impl IntoIterator<Item = &'a Row>,
) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;

    // Write header
    wtr.write_record(columns.iter().map(|col| col.label.as_str()))?;

    // Write data rows
    let mut count = 0;
    for row in rows {
        wtr.write_record(columns.iter().map(|col| match col.value(row) {
            Value::Null => String::new(),
            value => stringify(&value),
        }))?;
        count += 1;
    }

    wtr.flush()?;
    Ok(count)
}
