//! Path management for the ledger's data directory

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::LedgerError;

/// Resolves where data and settings files live
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Resolve the platform data directory for the application
    pub fn new() -> Result<Self, LedgerError> {
        let dirs = ProjectDirs::from("", "", "centavo")
            .ok_or_else(|| LedgerError::Config("Could not determine home directory".into()))?;

        Ok(Self {
            base_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Use an explicit base directory (tests, portable installs)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// The base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the JSON data files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn allocations_file(&self) -> PathBuf {
        self.data_dir().join("allocations.json")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Create the directory tree if it doesn't exist yet
    pub fn ensure_directories(&self) -> Result<(), LedgerError> {
        fs::create_dir_all(self.data_dir()).map_err(|e| {
            LedgerError::Config(format!(
                "Failed to create {}: {}",
                self.data_dir().display(),
                e
            ))
        })
    }
}
