//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably by the backend session.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{Employee, ServiceConfig, Transaction};

use crate::config::{default_employees, default_services, DATA_FORMAT_VERSION};

/// Trait defining the interface for transaction storage operations
///
/// Transactions are kept newest first, i.e. in reverse creation order.
pub trait TransactionStorage: Send + Sync {
    /// List every stored transaction, newest first
    fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// Store a new transaction as the most recent one
    fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Delete a single transaction
    /// Returns true if the transaction was found and deleted, false otherwise
    fn delete_transaction(&self, transaction_id: &str) -> Result<bool>;

    /// Replace the whole collection, keeping the given order
    fn replace_transactions(&self, transactions: &[Transaction]) -> Result<()>;
}

/// Persisted employee and service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSettings {
    pub employees: Vec<Employee>,
    pub services: Vec<ServiceConfig>,
    /// Data format version for future migrations
    pub data_format_version: String,
    pub updated_at: String,
}

impl StoredSettings {
    pub fn new(employees: Vec<Employee>, services: Vec<ServiceConfig>) -> Self {
        Self {
            employees,
            services,
            data_format_version: DATA_FORMAT_VERSION.to_string(),
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self::new(default_employees(), default_services())
    }
}

/// Trait defining the interface for settings storage operations
pub trait SettingsStorage: Send + Sync {
    /// Load the settings, creating the defaults on first use
    fn get_settings(&self) -> Result<StoredSettings>;

    /// Persist the settings, stamping `updated_at`
    fn save_settings(&self, settings: &StoredSettings) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides
/// factory methods for creating repositories.
pub trait Connection: Send + Sync + Clone {
    /// The type of TransactionStorage this connection creates
    type TransactionRepository: TransactionStorage;
    /// The type of SettingsStorage this connection creates
    type SettingsRepository: SettingsStorage;

    /// Create a new transaction repository for this connection
    fn create_transaction_repository(&self) -> Self::TransactionRepository;

    /// Create a new settings repository for this connection
    fn create_settings_repository(&self) -> Self::SettingsRepository;
}
