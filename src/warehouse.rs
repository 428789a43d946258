//! Consolidates a directory of unit files into one fact table.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::table::{
    Table, dedup_by_key, normalize_dates, read_csv_file, sort_chronologically, write_csv_atomic,
};
use crate::units::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseKind {
    Team,
    Player,
}

impl WarehouseKind {
    pub fn entity_kind(self) -> EntityKind {
        match self {
            WarehouseKind::Team => EntityKind::Team,
            WarehouseKind::Player => EntityKind::Player,
        }
    }
}

impl fmt::Display for WarehouseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity_kind().fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseReport {
    pub output: PathBuf,
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_written: usize,
    pub duplicates_dropped: usize,
    /// `GAME_DATE` cells that were kept verbatim because they did not parse
    pub unparsed_dates: usize,
}

/// Lists the `.csv` files of a directory in file-name order.
async fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| {
        AppError::warehouse_error(format!("Cannot read input directory {}: {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads every unit file in `input_dir`, deduplicates and sorts the union, and writes it to
/// `output`. The output is rebuilt from scratch on every call.
pub async fn build_warehouse(
    input_dir: &Path,
    output: &Path,
    kind: WarehouseKind,
) -> Result<WarehouseReport, AppError> {
    let files = list_csv_files(input_dir).await?;
    if files.is_empty() {
        return Err(AppError::warehouse_error(format!(
            "No CSV files found in {}",
            input_dir.display()
        )));
    }

    info!("Building {kind} warehouse from {} files", files.len());

    let mut tables = Vec::with_capacity(files.len());
    for file in &files {
        let table = read_csv_file(file).await?;
        debug!("{}: {} rows", file.display(), table.len());
        tables.push(table);
    }

    let combined = Table::concat(tables);
    let rows_read = combined.len();
    let (deduped, duplicates_dropped) =
        dedup_by_key(combined, &kind.entity_kind().natural_key());
    let mut table = sort_chronologically(deduped);
    let unparsed_dates = normalize_dates(&mut table);
    if unparsed_dates > 0 {
        warn!("{unparsed_dates} rows have an unparseable GAME_DATE; they are placed last");
    }

    write_csv_atomic(output, &table).await?;
    info!("Saved {} rows to {}", table.len(), output.display());

    Ok(WarehouseReport {
        output: output.to_path_buf(),
        files_read: files.len(),
        rows_read,
        rows_written: table.len(),
        duplicates_dropped,
        unparsed_dates,
    })
}
