//! Employee and service configuration management.
//!
//! Edits here only change configuration. Existing transactions keep the
//! amount, label and commission they were created with.

use anyhow::Result;
use log::{info, warn};
use rust_decimal::Decimal;
use shared::{CommissionOverride, CommissionType, Employee, ServiceConfig};
use uuid::Uuid;

use super::commands::settings::{SetCommissionOverrideCommand, UpdateServiceCommand};
use super::errors::TrackerError;
use super::state::TrackerState;

const DEFAULT_SERVICE_AMOUNT: i64 = 100;

#[derive(Clone, Default)]
pub struct SettingsService {}

impl SettingsService {
    pub fn new() -> Self {
        Self {}
    }

    pub fn add_employee(&self, state: &mut TrackerState, name: &str) -> Result<Employee> {
        let name = validate_name(name)?;
        let employee = Employee::new(Uuid::new_v4().to_string(), name);
        info!("Added employee {} ({})", employee.name, employee.id);
        state.employees_mut().push(employee.clone());
        Ok(employee)
    }

    pub fn rename_employee(
        &self,
        state: &mut TrackerState,
        employee_id: &str,
        name: &str,
    ) -> Result<Employee> {
        let name = validate_name(name)?;
        let employee = state
            .employee_mut(employee_id)
            .ok_or_else(|| TrackerError::EmployeeNotFound(employee_id.to_string()))?;
        info!("Renamed employee {} from '{}' to '{}'", employee_id, employee.name, name);
        employee.name = name;
        Ok(employee.clone())
    }

    pub fn set_commission_override(
        &self,
        state: &mut TrackerState,
        command: SetCommissionOverrideCommand,
    ) -> Result<Employee> {
        validate_rule(&command.commission_type, command.commission_value)?;
        if state.service(&command.service_id).is_none() {
            return Err(TrackerError::ServiceNotFound(command.service_id).into());
        }
        let employee = state
            .employee_mut(&command.employee_id)
            .ok_or_else(|| TrackerError::EmployeeNotFound(command.employee_id.clone()))?;

        info!(
            "Employee {} now earns {} {} on service {}",
            command.employee_id,
            command.commission_type,
            command.commission_value,
            command.service_id
        );
        employee.commission_overrides.insert(
            command.service_id,
            CommissionOverride {
                commission_type: command.commission_type,
                commission_value: command.commission_value,
            },
        );
        Ok(employee.clone())
    }

    /// Returns whether an override was removed
    pub fn clear_commission_override(
        &self,
        state: &mut TrackerState,
        employee_id: &str,
        service_id: &str,
    ) -> Result<bool> {
        let employee = state
            .employee_mut(employee_id)
            .ok_or_else(|| TrackerError::EmployeeNotFound(employee_id.to_string()))?;
        let removed = employee.commission_overrides.remove(service_id).is_some();
        if removed {
            info!(
                "Cleared commission override of employee {} on service {}",
                employee_id, service_id
            );
        }
        Ok(removed)
    }

    /// Add a service with default price and a 20% commission
    pub fn add_service(&self, state: &mut TrackerState) -> ServiceConfig {
        let service = ServiceConfig {
            id: Uuid::new_v4().to_string(),
            label: format!("New service {}", state.services().len() + 1),
            amount: Decimal::from(DEFAULT_SERVICE_AMOUNT),
            commission_type: CommissionType::Percentage,
            commission_value: Decimal::new(2, 1),
        };
        info!("Added service {} ({})", service.label, service.id);
        state.services_mut().push(service.clone());
        service
    }

    pub fn update_service(
        &self,
        state: &mut TrackerState,
        service_id: &str,
        command: UpdateServiceCommand,
    ) -> Result<ServiceConfig> {
        let existing = state
            .service(service_id)
            .ok_or_else(|| TrackerError::ServiceNotFound(service_id.to_string()))?;

        let mut updated = existing.clone();
        if let Some(label) = command.label {
            updated.label = validate_name(&label)?;
        }
        if let Some(amount) = command.amount {
            if amount < Decimal::ZERO {
                return Err(TrackerError::InvalidInput(format!(
                    "service amount must not be negative, got {}",
                    amount
                ))
                .into());
            }
            updated.amount = amount;
        }
        if let Some(commission_type) = command.commission_type {
            updated.commission_type = commission_type;
        }
        if let Some(commission_value) = command.commission_value {
            updated.commission_value = commission_value;
        }
        validate_rule(&updated.commission_type, updated.commission_value)?;

        if let Some(slot) = state.service_mut(service_id) {
            *slot = updated.clone();
        }
        info!(
            "Updated service {}: '{}' {} ({} {})",
            service_id,
            updated.label,
            updated.amount,
            updated.commission_type,
            updated.commission_value
        );
        Ok(updated)
    }

    /// Delete a service. The last remaining service cannot be deleted.
    pub fn delete_service(
        &self,
        state: &mut TrackerState,
        service_id: &str,
    ) -> Result<ServiceConfig> {
        let index = state
            .services()
            .iter()
            .position(|s| s.id == service_id)
            .ok_or_else(|| TrackerError::ServiceNotFound(service_id.to_string()))?;
        if state.services().len() <= 1 {
            warn!("Refusing to delete the last service {}", service_id);
            return Err(TrackerError::LastServiceDeletion.into());
        }

        let removed = state.services_mut().remove(index);
        for employee in state.employees_mut().iter_mut() {
            if employee.commission_overrides.remove(service_id).is_some() {
                info!(
                    "Dropped override of employee {} on deleted service {}",
                    employee.id, service_id
                );
            }
        }
        info!("Deleted service {} ({})", removed.label, removed.id);
        Ok(removed)
    }
}

fn validate_name(name: &str) -> Result<String, TrackerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::InvalidInput("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_rule(commission_type: &CommissionType, value: Decimal) -> Result<(), TrackerError> {
    if let CommissionType::Unsupported(raw) = commission_type {
        return Err(TrackerError::UnsupportedCommissionType(raw.clone()));
    }
    if value < Decimal::ZERO {
        return Err(TrackerError::InvalidInput(format!(
            "commission value must not be negative, got {}",
            value
        )));
    }
    Ok(())
}
