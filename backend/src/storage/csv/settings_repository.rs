//! # Settings Repository
//!
//! Employees and services live in a single YAML file `settings.yaml` at the
//! root of the data directory.
//!
//! ## YAML Format
//!
//! ```yaml
//! employees:
//! - id: '1'
//!   name: Employee 01
//!   commissionOverrides:
//!     s2:
//!       commissionType: fixed
//!       commissionValue: '8'
//! services:
//! - id: s1
//!   label: Massage 128
//!   amount: '128'
//!   commissionType: percentage
//!   commissionValue: '0.2'
//! data_format_version: '1.0'
//! updated_at: 2025-01-21T19:35:00Z
//! ```
//!
//! Decimals are written as strings so no digit is lost; plain YAML numbers
//! are accepted on read. A missing file is replaced by the default
//! configuration on first read.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::fs;

use super::connection::CsvConnection;
use super::write_atomically;
use crate::storage::traits::{SettingsStorage, StoredSettings};

/// YAML-backed settings repository
#[derive(Clone)]
pub struct SettingsRepository {
    connection: CsvConnection,
}

impl SettingsRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Load settings from file, creating the defaults if it doesn't exist
    fn load_or_create_settings(&self) -> Result<StoredSettings> {
        let settings_path = self.connection.settings_file_path();

        if settings_path.exists() {
            let yaml_content = fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            let settings: StoredSettings = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Failed to parse {:?}", settings_path))?;
            debug!("Loaded settings from {:?}", settings_path);
            Ok(settings)
        } else {
            let settings = StoredSettings::default();
            self.write_settings(&settings)?;
            info!("Created default settings at {:?}", settings_path);
            Ok(settings)
        }
    }

    fn write_settings(&self, settings: &StoredSettings) -> Result<()> {
        let settings_path = self.connection.settings_file_path();
        let yaml_content = serde_yaml::to_string(settings)?;
        write_atomically(&settings_path, yaml_content.as_bytes())?;
        debug!("Saved settings to {:?}", settings_path);
        Ok(())
    }
}

impl SettingsStorage for SettingsRepository {
    fn get_settings(&self) -> Result<StoredSettings> {
        self.load_or_create_settings()
    }

    fn save_settings(&self, settings: &StoredSettings) -> Result<()> {
        let mut updated = settings.clone();
        updated.updated_at = Utc::now().to_rfc3339();
        self.write_settings(&updated)?;
        info!(
            "Saved settings: {} employees, {} services",
            updated.employees.len(),
            updated.services.len()
        );
        Ok(())
    }
}
