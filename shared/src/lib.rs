use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a service (or an employee override) turns a price into a commission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommissionType {
    /// Commission is `amount * value`, value being a fraction (0.2 = 20%)
    Percentage,
    /// Commission is `value`, independent of the service amount
    Fixed,
    /// Anything else found in stored configuration; rejected at resolution time
    Unsupported(String),
}

impl CommissionType {
    pub fn as_str(&self) -> &str {
        match self {
            CommissionType::Percentage => "percentage",
            CommissionType::Fixed => "fixed",
            CommissionType::Unsupported(raw) => raw.as_str(),
        }
    }
}

impl From<String> for CommissionType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "percentage" => CommissionType::Percentage,
            "fixed" => CommissionType::Fixed,
            _ => CommissionType::Unsupported(raw),
        }
    }
}

impl From<CommissionType> for String {
    fn from(commission_type: CommissionType) -> Self {
        commission_type.as_str().to_string()
    }
}

impl fmt::Display for CommissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employee-specific replacement for a service's default commission rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionOverride {
    pub commission_type: CommissionType,
    pub commission_value: Decimal,
}

/// A member of staff who performs services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    /// Overrides keyed by service id, at most one per service
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commission_overrides: BTreeMap<String, CommissionOverride>,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            commission_overrides: BTreeMap::new(),
        }
    }

    pub fn override_for(&self, service_id: &str) -> Option<&CommissionOverride> {
        self.commission_overrides.get(service_id)
    }
}

/// A sellable service with its unit price and default commission rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub id: String,
    pub label: String,
    /// Unit price
    pub amount: Decimal,
    pub commission_type: CommissionType,
    /// Fraction for `percentage`, absolute amount for `fixed`
    pub commission_value: Decimal,
}

/// How the customer paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Online,
    Cash,
}

impl PaymentMethod {
    /// Stable storage code (`ONLINE` / `CASH`)
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "ONLINE",
            PaymentMethod::Cash => "CASH",
        }
    }

    /// Label shown to staff and written into exported reports
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "Online",
            PaymentMethod::Cash => "Cash",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, String> {
        match code {
            "ONLINE" => Ok(PaymentMethod::Online),
            "CASH" => Ok(PaymentMethod::Cash),
            _ => Err(format!("Invalid payment method: {}", code)),
        }
    }
}

/// A recorded sale. Amount, commission and label are snapshots taken when the
/// transaction was created and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub employee_id: String,
    /// Calendar day of the sale (YYYY-MM-DD)
    pub date: NaiveDate,
    pub amount: Decimal,
    pub commission: Decimal,
    pub payment_method: PaymentMethod,
    pub service_label: String,
}

/// Per-employee totals for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub employee_id: String,
    pub employee_name: String,
    pub total_online: Decimal,
    pub total_cash: Decimal,
    pub total_amount: Decimal,
    pub total_commission: Decimal,
}

impl MonthlySummary {
    pub fn empty(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            total_online: Decimal::ZERO,
            total_cash: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            total_commission: Decimal::ZERO,
        }
    }
}

/// Grand totals across all employees for the active month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub amount: Decimal,
    pub commission: Decimal,
    pub online: Decimal,
    pub cash: Decimal,
}

/// One employee's share of a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDayTotals {
    pub employee_id: String,
    pub employee_name: String,
    pub online: Decimal,
    pub cash: Decimal,
    pub total: Decimal,
}

/// Reconciliation totals for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub online: Decimal,
    pub cash: Decimal,
    pub total: Decimal,
    /// One entry per known employee, in employee list order
    pub employees: Vec<EmployeeDayTotals>,
}

impl DayTotals {
    pub fn employee(&self, employee_id: &str) -> Option<&EmployeeDayTotals> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }
}

/// Entry of the dashboard's recent activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub employee_id: String,
    /// `None` when the employee no longer exists in the configuration
    pub employee_name: Option<String>,
    pub service_label: String,
    pub amount: Decimal,
    pub formatted_amount: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// YYYY-MM
    pub month: String,
    pub totals: SummaryTotals,
    pub leaderboard: Vec<MonthlySummary>,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationView {
    /// Most recent day first
    pub days: Vec<DayTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// YYYY-MM
    pub month: String,
    /// Ranked by total amount, highest first
    pub summaries: Vec<MonthlySummary>,
    pub totals: SummaryTotals,
    /// The month's raw transactions, newest first
    pub transactions: Vec<Transaction>,
}

/// Tabular monthly report ready to be written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReportResponse {
    pub csv_content: String,
    pub filename: String,
    pub transaction_count: usize,
}

/// Full backup of transactions and configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    pub transactions: Vec<Transaction>,
    pub employees: Vec<Employee>,
    pub services: Vec<ServiceConfig>,
    /// Schema version tag
    pub version: String,
    /// RFC 3339 export time
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotExportResponse {
    pub json_content: String,
    pub filename: String,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreSnapshotResponse {
    pub transactions_restored: usize,
    pub employees_restored: Option<usize>,
    pub services_restored: Option<usize>,
    pub success_message: String,
}
