//! Transaction service domain logic for the commission tracker.
//!
//! Creating a transaction snapshots the service's amount and label and the
//! commission resolved at that instant. Later configuration edits never touch
//! stored transactions.

use anyhow::Result;
use log::{info, warn};
use shared::Transaction;
use uuid::Uuid;

use super::aggregation::MonthFilter;
use super::commands::transactions::{CreateTransactionCommand, TransactionListQuery};
use super::commission::resolve_commission;
use super::errors::TrackerError;
use super::money::format_currency;
use super::state::TrackerState;

#[derive(Clone, Default)]
pub struct TransactionService {}

impl TransactionService {
    pub fn new() -> Self {
        Self {}
    }

    /// Record a sale. On any failure the state is left untouched.
    pub fn create_transaction(
        &self,
        state: &mut TrackerState,
        command: CreateTransactionCommand,
    ) -> Result<Transaction> {
        let service = state
            .service(&command.service_id)
            .ok_or_else(|| TrackerError::InvalidService(command.service_id.clone()))?;
        let employee = state
            .employee(&command.employee_id)
            .ok_or_else(|| TrackerError::EmployeeNotFound(command.employee_id.clone()))?;

        let commission = resolve_commission(Some(service), Some(employee))?;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            employee_id: employee.id.clone(),
            date: command.date,
            amount: service.amount,
            commission,
            payment_method: command.payment_method,
            service_label: service.label.clone(),
        };

        info!(
            "Recorded {} for {} on {}: {} ({}), commission {}",
            transaction.service_label,
            employee.name,
            transaction.date,
            format_currency(transaction.amount),
            transaction.payment_method.display_name(),
            format_currency(transaction.commission)
        );

        state.prepend_transaction(transaction.clone());
        Ok(transaction)
    }

    pub fn delete_transaction(
        &self,
        state: &mut TrackerState,
        transaction_id: &str,
    ) -> Result<Transaction> {
        match state.remove_transaction(transaction_id) {
            Some(transaction) => {
                info!("Deleted transaction {}", transaction_id);
                Ok(transaction)
            }
            None => {
                warn!("Transaction not found for deletion: {}", transaction_id);
                Err(TrackerError::TransactionNotFound(transaction_id.to_string()).into())
            }
        }
    }

    /// Transactions matching the query, newest first
    pub fn list_transactions(
        &self,
        state: &TrackerState,
        query: &TransactionListQuery,
    ) -> Vec<Transaction> {
        state
            .transactions()
            .iter()
            .filter(|t| query.employee_id.as_ref().map_or(true, |id| &t.employee_id == id))
            .filter(|t| query.start_date.map_or(true, |start| t.date >= start))
            .filter(|t| query.end_date.map_or(true, |end| t.date <= end))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// The month's transactions, newest first
    pub fn transactions_for_month(
        &self,
        state: &TrackerState,
        month: &MonthFilter,
    ) -> Vec<Transaction> {
        state
            .transactions()
            .iter()
            .filter(|t| month.matches(t.date))
            .cloned()
            .collect()
    }
}
