//! # Domain Module
//!
//! Business rules of the commission tracker, independent of where the data is
//! stored.
//!
//! ## Components
//!
//! - `commission`: resolves the commission owed for one sale
//! - `aggregation`: per-employee monthly totals and per-day reconciliation
//! - `summary`: dashboard, payroll report and reconciliation views
//! - `state`: the owned collections every service operates on
//! - `transaction_service`, `settings_service`, `export_service`: mutations
//!   and exports over that state
//!
//! Services never touch storage. The `Backend` persists the affected
//! collection after a service call succeeds.

pub mod aggregation;
pub mod commands;
pub mod commission;
pub mod errors;
pub mod export_service;
pub mod money;
pub mod settings_service;
pub mod state;
pub mod summary;
pub mod transaction_service;

pub use aggregation::{
    aggregate_by_day, aggregate_by_day_with_limit, aggregate_by_employee, MonthFilter,
    RECONCILIATION_DAY_LIMIT,
};
pub use commission::resolve_commission;
pub use errors::TrackerError;
pub use export_service::ExportService;
pub use money::{format_currency, plain_amount};
pub use settings_service::SettingsService;
pub use state::TrackerState;
pub use summary::{SummaryBuilder, RECENT_ACTIVITY_LIMIT};
pub use transaction_service::TransactionService;
