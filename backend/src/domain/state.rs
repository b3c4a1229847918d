//! In-memory domain state owned by a tracker session.

use shared::{Employee, ServiceConfig, Transaction};
use std::collections::HashSet;

use super::errors::TrackerError;

/// Transactions plus the configuration they reference.
///
/// Transactions are held newest first, i.e. in reverse creation order. The
/// state is only mutated through the domain services; persistence happens
/// afterwards through the storage adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerState {
    transactions: Vec<Transaction>,
    employees: Vec<Employee>,
    services: Vec<ServiceConfig>,
}

impl TrackerState {
    /// Build a state, checking id uniqueness and that at least one service exists
    pub fn new(
        employees: Vec<Employee>,
        services: Vec<ServiceConfig>,
        transactions: Vec<Transaction>,
    ) -> Result<Self, TrackerError> {
        if services.is_empty() {
            return Err(TrackerError::InvalidInput(
                "at least one service is required".to_string(),
            ));
        }
        ensure_unique("employee", employees.iter().map(|e| e.id.as_str()))?;
        ensure_unique("service", services.iter().map(|s| s.id.as_str()))?;
        ensure_unique("transaction", transactions.iter().map(|t| t.id.as_str()))?;

        Ok(Self {
            transactions,
            employees,
            services,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn services(&self) -> &[ServiceConfig] {
        &self.services
    }

    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == employee_id)
    }

    pub fn service(&self, service_id: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.id == service_id)
    }

    pub fn transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == transaction_id)
    }

    pub(crate) fn employee_mut(&mut self, employee_id: &str) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|e| e.id == employee_id)
    }

    pub(crate) fn service_mut(&mut self, service_id: &str) -> Option<&mut ServiceConfig> {
        self.services.iter_mut().find(|s| s.id == service_id)
    }

    pub(crate) fn employees_mut(&mut self) -> &mut Vec<Employee> {
        &mut self.employees
    }

    pub(crate) fn services_mut(&mut self) -> &mut Vec<ServiceConfig> {
        &mut self.services
    }

    /// Record a new transaction as the most recent one
    pub(crate) fn prepend_transaction(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
    }

    pub(crate) fn remove_transaction(&mut self, transaction_id: &str) -> Option<Transaction> {
        let index = self.transactions.iter().position(|t| t.id == transaction_id)?;
        Some(self.transactions.remove(index))
    }
}

pub(crate) fn ensure_unique<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), TrackerError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(TrackerError::InvalidInput(format!("duplicate {} id '{}'", kind, id)));
        }
    }
    Ok(())
}
