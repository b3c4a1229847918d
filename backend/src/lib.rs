//! # Commission Tracker Backend
//!
//! Core of a single-location commission and payroll tracker. Staff record a
//! sale by picking an employee, a service, a date and a payment method; the
//! backend freezes the commission owed at that moment and derives the
//! monthly payroll, the dashboard and the daily cash reconciliation from the
//! recorded sales.
//!
//! `Backend` is the entry point. It owns the in-memory state and runs every
//! operation through the domain services on a copy of it. The copy becomes
//! the live state only after the affected collection has been saved, so a
//! failed write leaves both memory and disk as they were. All operations are
//! synchronous.

use anyhow::{Context, Result};
use log::{error, info};
use shared::{
    DashboardView, Employee, ExportReportResponse, MonthlyReport, ReconciliationView,
    RestoreSnapshotResponse, ServiceConfig, SnapshotExportResponse, Transaction,
};
use std::path::PathBuf;

pub mod config;
pub mod domain;
pub mod logging;
pub mod storage;

pub use config::TrackerConfig;
pub use domain::TrackerError;
pub use storage::CsvConnection;

use domain::commands::settings::{SetCommissionOverrideCommand, UpdateServiceCommand};
use domain::commands::transactions::{CreateTransactionCommand, TransactionListQuery};
use domain::{
    ExportService, MonthFilter, SettingsService, SummaryBuilder, TrackerState, TransactionService,
};
use storage::{Connection, SettingsStorage, StoredSettings, TransactionStorage};

/// Main backend struct that orchestrates all services
pub struct Backend<C: Connection = CsvConnection> {
    state: TrackerState,
    transaction_repository: C::TransactionRepository,
    settings_repository: C::SettingsRepository,
    pub transaction_service: TransactionService,
    pub settings_service: SettingsService,
    pub summary_builder: SummaryBuilder,
    pub export_service: ExportService,
}

impl Backend<CsvConnection> {
    /// Open the tracker in the configured data directory
    pub fn open_default() -> Result<Self> {
        let config = TrackerConfig::resolve()?;
        Self::open(&config)
    }

    pub fn open(config: &TrackerConfig) -> Result<Self> {
        let connection = CsvConnection::new(&config.data_directory).with_context(|| {
            format!("Failed to open data directory {}", config.data_directory.display())
        })?;
        Self::with_connection(connection)
    }
}

impl<C: Connection> Backend<C> {
    /// Load settings (creating the defaults on first use) and transactions
    pub fn with_connection(connection: C) -> Result<Self> {
        let transaction_repository = connection.create_transaction_repository();
        let settings_repository = connection.create_settings_repository();

        let settings = settings_repository
            .get_settings()
            .context("Failed to load settings")?;
        let transactions = transaction_repository
            .list_transactions()
            .context("Failed to load transactions")?;
        let state = TrackerState::new(settings.employees, settings.services, transactions)
            .context("Stored data is inconsistent")?;

        info!(
            "Loaded {} transactions, {} employees, {} services",
            state.transactions().len(),
            state.employees().len(),
            state.services().len()
        );

        Ok(Self {
            state,
            transaction_repository,
            settings_repository,
            transaction_service: TransactionService::new(),
            settings_service: SettingsService::new(),
            summary_builder: SummaryBuilder::new(),
            export_service: ExportService::new(),
        })
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    fn persist_settings(&self, state: &TrackerState) -> Result<()> {
        let settings =
            StoredSettings::new(state.employees().to_vec(), state.services().to_vec());
        self.settings_repository
            .save_settings(&settings)
            .context("Failed to save settings")
    }

    /// Apply a settings change to a copy of the state; the copy replaces the
    /// live state only once it has been saved
    fn update_settings<T>(
        &mut self,
        change: impl FnOnce(&SettingsService, &mut TrackerState) -> Result<T>,
    ) -> Result<T> {
        let mut next = self.state.clone();
        let value = change(&self.settings_service, &mut next)?;
        self.persist_settings(&next)?;
        self.state = next;
        Ok(value)
    }

    // Transactions

    pub fn create_transaction(&mut self, command: CreateTransactionCommand) -> Result<Transaction> {
        let mut next = self.state.clone();
        let transaction = self.transaction_service.create_transaction(&mut next, command)?;
        self.transaction_repository
            .store_transaction(&transaction)
            .context("Failed to save transaction")?;
        self.state = next;
        Ok(transaction)
    }

    pub fn delete_transaction(&mut self, transaction_id: &str) -> Result<Transaction> {
        let mut next = self.state.clone();
        let transaction = self
            .transaction_service
            .delete_transaction(&mut next, transaction_id)?;
        self.transaction_repository
            .delete_transaction(transaction_id)
            .context("Failed to delete stored transaction")?;
        self.state = next;
        Ok(transaction)
    }

    pub fn list_transactions(&self, query: &TransactionListQuery) -> Vec<Transaction> {
        self.transaction_service.list_transactions(&self.state, query)
    }

    // Settings

    pub fn add_employee(&mut self, name: &str) -> Result<Employee> {
        self.update_settings(|service, state| service.add_employee(state, name))
    }

    pub fn rename_employee(&mut self, employee_id: &str, name: &str) -> Result<Employee> {
        self.update_settings(|service, state| service.rename_employee(state, employee_id, name))
    }

    pub fn set_commission_override(
        &mut self,
        command: SetCommissionOverrideCommand,
    ) -> Result<Employee> {
        self.update_settings(|service, state| service.set_commission_override(state, command))
    }

    pub fn clear_commission_override(
        &mut self,
        employee_id: &str,
        service_id: &str,
    ) -> Result<bool> {
        let mut next = self.state.clone();
        let removed = self
            .settings_service
            .clear_commission_override(&mut next, employee_id, service_id)?;
        if removed {
            self.persist_settings(&next)?;
            self.state = next;
        }
        Ok(removed)
    }

    pub fn add_service(&mut self) -> Result<ServiceConfig> {
        self.update_settings(|service, state| Ok(service.add_service(state)))
    }

    pub fn update_service(
        &mut self,
        service_id: &str,
        command: UpdateServiceCommand,
    ) -> Result<ServiceConfig> {
        self.update_settings(|service, state| service.update_service(state, service_id, command))
    }

    pub fn delete_service(&mut self, service_id: &str) -> Result<ServiceConfig> {
        self.update_settings(|service, state| service.delete_service(state, service_id))
    }

    // Views

    /// Dashboard for a `YYYY-MM` month
    pub fn dashboard(&self, month: &str) -> Result<DashboardView> {
        let month = MonthFilter::parse(month)?;
        Ok(self.summary_builder.dashboard(&self.state, &month))
    }

    pub fn monthly_report(&self, month: &str) -> Result<MonthlyReport> {
        let month = MonthFilter::parse(month)?;
        Ok(self.summary_builder.monthly_report(&self.state, &month))
    }

    pub fn reconciliation(&self) -> ReconciliationView {
        self.summary_builder.reconciliation(&self.state)
    }

    // Export and backup

    pub fn export_report_csv(&self, month: &str) -> Result<ExportReportResponse> {
        let month = MonthFilter::parse(month)?;
        self.export_service.monthly_report_csv(&self.state, &month)
    }

    pub fn export_snapshot(&self) -> Result<SnapshotExportResponse> {
        self.export_service.snapshot_json(&self.state)
    }

    /// Replace the data with a backup. Storage is only written once the
    /// snapshot has been accepted, and the live state changes only after
    /// both files are saved.
    pub fn restore_snapshot(&mut self, json: &str) -> Result<RestoreSnapshotResponse> {
        let mut next = self.state.clone();
        let response = self.export_service.restore_snapshot(&mut next, json)?;
        self.transaction_repository
            .replace_transactions(next.transactions())
            .context("Failed to save restored transactions")?;

        if let Err(e) = self.persist_settings(&next) {
            // Put the previous transactions back so both files still match
            if let Err(rollback) = self
                .transaction_repository
                .replace_transactions(self.state.transactions())
            {
                error!("Failed to roll back restored transactions: {:#}", rollback);
            }
            return Err(e);
        }

        self.state = next;
        Ok(response)
    }

    /// Write exported content to `directory`, or the Documents folder when `None`
    pub fn save_export(
        &self,
        directory: Option<&str>,
        filename: &str,
        content: &str,
    ) -> Result<PathBuf> {
        self.export_service.write_to_path(directory, filename, content)
    }
}
