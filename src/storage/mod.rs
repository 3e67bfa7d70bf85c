// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use crate::assemble::{Dataset, DatasetKind};
use crate::utils::error::StorageError;

const DATASET_EXTENSION: &str = "csv";

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager rooted at the data directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// `<base>/<kind>/<YYYY-MM-DD>.csv`
    pub fn dataset_path(&self, kind: DatasetKind, date: NaiveDate) -> PathBuf {
        self.base_dir
            .join(kind.dir_name())
            .join(format!("{}.{}", date.format("%Y-%m-%d"), DATASET_EXTENSION))
    }

    /// Writes the dataset as CSV, replacing any file already there for that date.
    /// The rows go to a temporary file next to the target first, so a failed
    /// write never leaves a truncated dataset behind.
    pub fn save_dataset(&self, dataset: &Dataset) -> Result<PathBuf, StorageError> {
        let file_path = self.dataset_path(dataset.kind, dataset.date);
        let target_dir = file_path
            .parent()
            .ok_or_else(|| StorageError::SerializationError(format!("No parent for {}", file_path.display())))?;

        if !target_dir.exists() {
            fs::create_dir_all(target_dir).map_err(StorageError::IoError)?;
        }

        let columns = dataset.columns();
        let mut writer = csv::Writer::from_writer(NamedTempFile::new_in(target_dir)?);
        writer.write_record(&columns)?;
        for record in &dataset.records {
            writer.write_record(columns.iter().map(|column| record.value(column).unwrap_or_default()))?;
        }

        let temp_file = writer
            .into_inner()
            .map_err(|e| StorageError::IoError(e.into_error()))?;
        temp_file.as_file().sync_all()?;

        if file_path.exists() {
            tracing::info!("Replacing existing dataset at {}", file_path.display());
        }
        temp_file.persist(&file_path)?;

        tracing::info!("Saved {} rows to {}", dataset.len(), file_path.display());
        Ok(file_path)
    }
}
