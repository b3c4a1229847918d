//! # CSV Storage Module
//!
//! File-based storage for the commission tracker.
//!
//! ## File Structure
//!
//! ```text
//! <data directory>/
//! ├── settings.yaml       ← employees and services
//! └── transactions.csv    ← every recorded sale, newest first
//! ```
//!
//! ## File Format
//!
//! ```csv
//! id,employee_id,date,amount,commission,payment_method,service_label
//! 0b7e...,1,2024-05-02,128,25.6,ONLINE,Massage 128
//! ```
//!
//! Every write goes to a temp file first and is then renamed over the
//! target, so a crash never leaves a half-written file behind.

pub mod connection;
pub mod settings_repository;
pub mod transaction_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use settings_repository::SettingsRepository;
pub use transaction_repository::TransactionRepository;

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Write `content` to `path` through a sibling temp file and a rename
pub(crate) fn write_atomically(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
