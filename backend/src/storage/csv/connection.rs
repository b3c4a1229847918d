use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::traits::Connection;

const TRANSACTIONS_FILE: &str = "transactions.csv";
const SETTINGS_FILE: &str = "settings.yaml";

/// CsvConnection manages the data directory the repositories read and write
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn transactions_file_path(&self) -> PathBuf {
        self.base_directory.join(TRANSACTIONS_FILE)
    }

    pub fn settings_file_path(&self) -> PathBuf {
        self.base_directory.join(SETTINGS_FILE)
    }
}

impl Connection for CsvConnection {
    type TransactionRepository = super::transaction_repository::TransactionRepository;
    type SettingsRepository = super::settings_repository::SettingsRepository;

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        super::transaction_repository::TransactionRepository::new(self.clone())
    }

    fn create_settings_repository(&self) -> Self::SettingsRepository {
        super::settings_repository::SettingsRepository::new(self.clone())
    }
}
