//! Where completed units end up. The presence of a unit's file is the resume signal.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;
use crate::table::{Table, write_csv_atomic};

#[allow(async_fn_in_trait)]
pub trait Sink {
    /// Whether a completed file for this unit is already present
    async fn exists(&self, file: &str) -> bool;

    /// Stores a finished unit. Either the whole table lands under `file` or nothing does.
    async fn persist(&self, file: &str, table: &Table) -> Result<(), AppError>;
}

/// A directory of CSV files, one per unit.
#[derive(Debug, Clone)]
pub struct CsvDirSink {
    dir: PathBuf,
}

impl CsvDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

impl Sink for CsvDirSink {
    async fn exists(&self, file: &str) -> bool {
        let path = self.path_for(file);
        match tokio::fs::try_exists(&path).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!("Could not check {}: {e}", path.display());
                false
            }
        }
    }

    async fn persist(&self, file: &str, table: &Table) -> Result<(), AppError> {
        write_csv_atomic(&self.path_for(file), table).await
    }
}
