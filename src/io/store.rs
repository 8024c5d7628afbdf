//! Bronze and silver directories.
//!
//! Bronze holds the downloaded spreadsheets byte for byte; a file's presence
//! means the week has been acquired. Silver holds the derived CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BRONZE_DIR_NAME, PipelineConfig, SILVER_DIR_NAME};
use crate::domain::ARTIFACT_EXT;
use crate::error::AppError;

const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Clone)]
pub struct DataStores {
    bronze: PathBuf,
    silver: PathBuf,
}

impl DataStores {
    /// Create (if needed) `<data_dir>/Data-bronze` and `<data_dir>/Data-silver`.
    pub fn open(data_dir: &Path) -> Result<Self, AppError> {
        let stores = Self {
            bronze: data_dir.join(BRONZE_DIR_NAME),
            silver: data_dir.join(SILVER_DIR_NAME),
        };
        for dir in [&stores.bronze, &stores.silver] {
            fs::create_dir_all(dir).map_err(|e| {
                AppError::external(format!("Failed to create directory '{}': {e}", dir.display()))
            })?;
        }
        Ok(stores)
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, AppError> {
        Self::open(&config.data_dir)
    }

    pub fn bronze_dir(&self) -> &Path {
        &self.bronze
    }

    pub fn silver_dir(&self) -> &Path {
        &self.silver
    }

    pub fn bronze_path(&self, file_name: &str) -> PathBuf {
        self.bronze.join(file_name)
    }

    pub fn silver_path(&self, file_name: &str) -> PathBuf {
        self.silver.join(file_name)
    }

    /// Presence check only; contents are never inspected.
    pub fn has_bronze(&self, file_name: &str) -> bool {
        self.bronze_path(file_name).is_file()
    }

    /// Persist downloaded bytes unchanged.
    ///
    /// Bytes go to a `.part` file first and are renamed into place, so an
    /// interrupted write never leaves a file that looks acquired.
    pub fn write_bronze(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let path = self.bronze_path(file_name);
        let partial = self.bronze_path(&format!("{file_name}{PARTIAL_SUFFIX}"));

        fs::write(&partial, bytes).map_err(|e| {
            AppError::external(format!("Failed to write '{}': {e}", partial.display()))
        })?;
        fs::rename(&partial, &path).map_err(|e| {
            AppError::external(format!(
                "Failed to move '{}' to '{}': {e}",
                partial.display(),
                path.display()
            ))
        })?;

        Ok(path)
    }

    /// Every `*.xlsx` file currently in the bronze store, sorted by file name.
    pub fn list_bronze_artifacts(&self) -> Result<Vec<PathBuf>, AppError> {
        let entries = fs::read_dir(&self.bronze).map_err(|e| {
            AppError::external(format!("Failed to list '{}': {e}", self.bronze.display()))
        })?;

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AppError::external(format!("Failed to list '{}': {e}", self.bronze.display()))
            })?;
            let path = entry.path();
            let is_artifact = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(ARTIFACT_EXT));
            if is_artifact && path.is_file() {
                out.push(path);
            }
        }

        out.sort();
        Ok(out)
    }
}
