//! CSV encoding of [`Table`]s.

use std::io::Read;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use super::Table;
use crate::constants::paths::PARTIAL_SUFFIX;
use crate::error::AppError;

/// Reads a CSV document with a header row.
///
/// Bytes that are not valid UTF-8 (older exports are Windows-1252) are replaced with
/// U+FFFD instead of failing the whole file.
pub fn table_from_reader<R: Read>(reader: R) -> Result<Table, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let header: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();

    let mut table = Table::new(header);
    for record in rdr.byte_records() {
        let record = record?;
        table.push_row(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }
    Ok(table)
}

/// Serialises a table as CSV: header row first, then every row.
pub fn table_to_csv_bytes(table: &Table) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if !table.columns().is_empty() {
        wtr.write_record(table.columns())?;
    }
    for row in table.rows() {
        wtr.write_record(row)?;
    }
    wtr.into_inner().map_err(|e| AppError::Io(e.into_error()))
}

/// Reads a CSV file from disk.
pub async fn read_csv_file(path: &Path) -> Result<Table, AppError> {
    let bytes = fs::read(path).await?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    table_from_reader(bytes.as_slice())
}

/// Writes a table to `path` so that the file either holds the complete table or does not
/// change at all: the content goes to `<path>.partial` first and is renamed into place.
pub async fn write_csv_atomic(path: &Path, table: &Table) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    let bytes = table_to_csv_bytes(table)?;
    let partial = partial_path(path);
    fs::write(&partial, &bytes).await?;
    fs::rename(&partial, path).await?;
    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}
