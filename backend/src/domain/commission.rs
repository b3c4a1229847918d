//! Commission resolution.
//!
//! A transaction's commission is computed exactly once, when the transaction
//! is created, from the service's price and either the employee's override for
//! that service or the service's own rule. The result is kept at full decimal
//! precision; rounding is left to presentation.

use rust_decimal::Decimal;
use shared::{CommissionType, Employee, ServiceConfig};

use super::errors::TrackerError;

/// Compute the commission owed for one unit of `service` performed by `employee`.
///
/// An override on the employee keyed by `service.id` replaces the service's
/// rule entirely. `percentage` yields `service.amount * value`, `fixed` yields
/// `value` regardless of the price.
pub fn resolve_commission(
    service: Option<&ServiceConfig>,
    employee: Option<&Employee>,
) -> Result<Decimal, TrackerError> {
    let service = service
        .ok_or_else(|| TrackerError::InvalidService("no service supplied".to_string()))?;

    let (commission_type, commission_value) =
        match employee.and_then(|e| e.override_for(&service.id)) {
            Some(rule) => (&rule.commission_type, rule.commission_value),
            None => (&service.commission_type, service.commission_value),
        };

    match commission_type {
        CommissionType::Percentage => service
            .amount
            .checked_mul(commission_value)
            .ok_or_else(|| {
                TrackerError::InvalidInput(format!(
                    "commission for service '{}' is out of range",
                    service.id
                ))
            }),
        CommissionType::Fixed => Ok(commission_value),
        CommissionType::Unsupported(raw) => {
            Err(TrackerError::UnsupportedCommissionType(raw.clone()))
        }
    }
}
