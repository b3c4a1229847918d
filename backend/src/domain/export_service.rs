//! Export service domain logic for the commission tracker.
//!
//! This module holds the monthly payroll CSV report and the JSON snapshot
//! backup/restore. The caller decides where the produced content ends up;
//! `write_to_path` covers the common "save to Documents" case.

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shared::{
    DataSnapshot, Employee, ExportReportResponse, RestoreSnapshotResponse, ServiceConfig,
    SnapshotExportResponse, Transaction,
};
use std::fs;
use std::path::PathBuf;

use super::aggregation::MonthFilter;
use super::errors::TrackerError;
use super::money::plain_amount;
use super::state::TrackerState;

/// Version tag written into every snapshot
pub const SNAPSHOT_VERSION: &str = "3.0";

const UTF8_BOM: &str = "\u{FEFF}";
const REPORT_HEADER: [&str; 6] = [
    "Date",
    "Employee",
    "Service",
    "Amount",
    "Commission",
    "Payment Method",
];
const UNKNOWN_EMPLOYEE: &str = "Unknown";

#[derive(Clone, Default)]
pub struct ExportService {}

impl ExportService {
    pub fn new() -> Self {
        Self {}
    }

    /// Build the payroll CSV for one month, one row per transaction in store order
    pub fn monthly_report_csv(
        &self,
        state: &TrackerState,
        month: &MonthFilter,
    ) -> Result<ExportReportResponse> {
        let rows: Vec<&Transaction> = state
            .transactions()
            .iter()
            .filter(|tx| month.matches(tx.date))
            .collect();

        if rows.is_empty() {
            warn!("No transactions to export for {}", month);
            return Err(TrackerError::NoTransactionsForMonth(month.to_string()).into());
        }

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(REPORT_HEADER)?;

        for tx in &rows {
            let employee_name = state
                .employee(&tx.employee_id)
                .map(|e| e.name.as_str())
                .unwrap_or(UNKNOWN_EMPLOYEE);
            writer.write_record([
                tx.date.format("%Y-%m-%d").to_string().as_str(),
                employee_name,
                tx.service_label.as_str(),
                plain_amount(tx.amount).as_str(),
                plain_amount(tx.commission).as_str(),
                tx.payment_method.display_name(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush report writer: {}", e))?;
        let body = String::from_utf8(bytes).context("Report is not valid UTF-8")?;

        let response = ExportReportResponse {
            csv_content: format!("{}{}", UTF8_BOM, body),
            filename: format!("commission_report_{}.csv", month),
            transaction_count: rows.len(),
        };

        info!(
            "Exported {} transactions for {} ({} bytes) as {}",
            response.transaction_count,
            month,
            response.csv_content.len(),
            response.filename
        );
        Ok(response)
    }

    /// Capture everything needed to rebuild the state
    pub fn export_snapshot(&self, state: &TrackerState) -> DataSnapshot {
        DataSnapshot {
            transactions: state.transactions().to_vec(),
            employees: state.employees().to_vec(),
            services: state.services().to_vec(),
            version: SNAPSHOT_VERSION.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn snapshot_json(&self, state: &TrackerState) -> Result<SnapshotExportResponse> {
        let snapshot = self.export_snapshot(state);
        let json_content =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;

        Ok(SnapshotExportResponse {
            json_content,
            filename: format!("commission_backup_{}.json", Local::now().format("%Y-%m-%d")),
            transaction_count: snapshot.transactions.len(),
        })
    }

    /// Replace the state's collections with the snapshot's.
    ///
    /// `transactions` must be present. `employees` and `services` are only
    /// replaced when present. Nothing is applied unless the whole snapshot
    /// decodes and validates.
    pub fn restore_snapshot(
        &self,
        state: &mut TrackerState,
        json: &str,
    ) -> Result<RestoreSnapshotResponse> {
        let restored = match decode_snapshot(state, json) {
            Ok(restored) => restored,
            Err(e) => {
                error!("Snapshot rejected: {}", e);
                return Err(e.into());
            }
        };

        let response = RestoreSnapshotResponse {
            transactions_restored: restored.state.transactions().len(),
            employees_restored: restored
                .employees_replaced
                .then(|| restored.state.employees().len()),
            services_restored: restored
                .services_replaced
                .then(|| restored.state.services().len()),
            success_message: "Data restored successfully".to_string(),
        };

        *state = restored.state;
        info!(
            "Restored snapshot: {} transactions, employees {:?}, services {:?}",
            response.transactions_restored, response.employees_restored, response.services_restored
        );
        Ok(response)
    }

    /// Write exported content into `directory`, or the user's Documents folder.
    ///
    /// A directory typed as the full file path (ending in `filename`) writes
    /// next to it instead of nesting a folder of the same name.
    pub fn write_to_path(
        &self,
        directory: Option<&str>,
        filename: &str,
        content: &str,
    ) -> Result<PathBuf> {
        let mut export_dir = match directory {
            Some(custom_path) if !custom_path.trim().is_empty() => export_directory(custom_path),
            _ => dirs::document_dir()
                .or_else(dirs::home_dir)
                .ok_or_else(|| anyhow::anyhow!("Could not determine default export directory"))?,
        };
        if export_dir.file_name().map_or(false, |name| name == filename) {
            if let Some(parent) = export_dir.parent() {
                export_dir = parent.to_path_buf();
            }
        }

        fs::create_dir_all(&export_dir)
            .with_context(|| format!("Failed to create export directory {:?}", export_dir))?;

        let file_path = export_dir.join(filename);
        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write export file {:?}", file_path))?;

        info!("Wrote {} ({} bytes)", file_path.display(), content.len());
        Ok(file_path)
    }
}

/// Directory typed by the user: surrounding quotes are dropped and a leading
/// `~` means the home directory
fn export_directory(raw: &str) -> PathBuf {
    let unquoted = raw.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    let is_separator = |c: char| c == '/' || c == '\\';

    match (unquoted.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with(is_separator) => {
            let relative = rest.trim_start_matches(is_separator);
            if relative.is_empty() {
                home
            } else {
                home.join(relative)
            }
        }
        _ => PathBuf::from(unquoted),
    }
}

struct RestoredState {
    state: TrackerState,
    employees_replaced: bool,
    services_replaced: bool,
}

fn decode_snapshot(current: &TrackerState, json: &str) -> Result<RestoredState, TrackerError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| TrackerError::MalformedSnapshot(format!("invalid JSON: {}", e)))?;
    let object = value.as_object().ok_or_else(|| {
        TrackerError::MalformedSnapshot("snapshot must be a JSON object".to_string())
    })?;

    let transactions: Vec<Transaction> = match object.get("transactions") {
        Some(raw @ Value::Array(_)) => decode_collection("transactions", raw)?,
        Some(Value::Null) | None => {
            return Err(TrackerError::MalformedSnapshot(
                "missing transactions collection".to_string(),
            ))
        }
        Some(_) => {
            return Err(TrackerError::MalformedSnapshot(
                "transactions must be an array".to_string(),
            ))
        }
    };
    let employees: Option<Vec<Employee>> = decode_optional("employees", object.get("employees"))?;
    let services: Option<Vec<ServiceConfig>> = decode_optional("services", object.get("services"))?;

    if matches!(&services, Some(list) if list.is_empty()) {
        return Err(TrackerError::MalformedSnapshot(
            "services must not be empty".to_string(),
        ));
    }
    let employees_replaced = employees.is_some();
    let services_replaced = services.is_some();
    let state = TrackerState::new(
        employees.unwrap_or_else(|| current.employees().to_vec()),
        services.unwrap_or_else(|| current.services().to_vec()),
        transactions,
    )
    .map_err(|e| TrackerError::MalformedSnapshot(e.to_string()))?;

    Ok(RestoredState {
        state,
        employees_replaced,
        services_replaced,
    })
}

fn decode_optional<T: DeserializeOwned>(
    name: &str,
    raw: Option<&Value>,
) -> Result<Option<Vec<T>>, TrackerError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode_collection(name, value).map(Some),
    }
}

fn decode_collection<T: DeserializeOwned>(name: &str, raw: &Value) -> Result<Vec<T>, TrackerError> {
    Vec::<T>::deserialize(raw)
        .map_err(|e| TrackerError::MalformedSnapshot(format!("invalid {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::{CommissionType, PaymentMethod};
    use std::str::FromStr;
    use tempfile::TempDir;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn tx(
        id: &str,
        employee_id: &str,
        day: &str,
        amount: &str,
        commission: &str,
        method: PaymentMethod,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            employee_id: employee_id.to_string(),
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            amount: dec(amount),
            commission: dec(commission),
            payment_method: method,
            service_label: "Massage, full".to_string(),
        }
    }

    fn create_test_state() -> TrackerState {
        TrackerState::new(
            vec![Employee::new("1", "A"), Employee::new("2", "B")],
            vec![ServiceConfig {
                id: "s1".to_string(),
                label: "Massage".to_string(),
                amount: dec("128"),
                commission_type: CommissionType::Percentage,
                commission_value: dec("0.2"),
            }],
            vec![
                tx("t3", "ghost", "2024-05-03", "48", "5", PaymentMethod::Cash),
                tx("t2", "1", "2024-05-02", "128", "25.6", PaymentMethod::Online),
                tx("t1", "2", "2024-04-30", "128", "25.6", PaymentMethod::Cash),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_monthly_report_csv() {
        let service = ExportService::new();
        let state = create_test_state();

        let report = service
            .monthly_report_csv(&state, &MonthFilter::parse("2024-05").unwrap())
            .unwrap();

        assert_eq!(report.filename, "commission_report_2024-05.csv");
        assert_eq!(report.transaction_count, 2);
        assert!(report.csv_content.starts_with('\u{FEFF}'));

        let lines: Vec<&str> = report.csv_content.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(lines[0], "Date,Employee,Service,Amount,Commission,Payment Method");
        assert_eq!(lines[1], "2024-05-03,Unknown,\"Massage, full\",48,5,Cash");
        assert_eq!(lines[2], "2024-05-02,A,\"Massage, full\",128,25.6,Online");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_monthly_report_csv_empty_month() {
        let service = ExportService::new();
        let state = create_test_state();

        let err = service
            .monthly_report_csv(&state, &MonthFilter::parse("2023-01").unwrap())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<TrackerError>(),
            Some(&TrackerError::NoTransactionsForMonth("2023-01".to_string()))
        );
    }

    #[test]
    fn test_snapshot_round_trip_restores_state() {
        let service = ExportService::new();
        let state = create_test_state();

        let exported = service.snapshot_json(&state).unwrap();
        assert!(exported.filename.starts_with("commission_backup_"));
        assert_eq!(exported.transaction_count, 3);
        assert!(exported.json_content.contains("\"version\": \"3.0\""));
        assert!(exported.json_content.contains("\"employeeId\""));

        let mut target = TrackerState::new(
            vec![Employee::new("9", "Z")],
            vec![ServiceConfig {
                id: "x".to_string(),
                label: "X".to_string(),
                amount: dec("1"),
                commission_type: CommissionType::Fixed,
                commission_value: dec("1"),
            }],
            vec![],
        )
        .unwrap();

        let response = service.restore_snapshot(&mut target, &exported.json_content).unwrap();
        assert_eq!(response.transactions_restored, 3);
        assert_eq!(response.employees_restored, Some(2));
        assert_eq!(response.services_restored, Some(1));
        assert_eq!(target, state);
    }

    #[test]
    fn test_snapshot_keeps_every_decimal_digit() {
        let service = ExportService::new();
        let third = dec("0.3333333333333333333333333333");
        let commission = dec("199.99") * third;
        let mut employee = Employee::new("1", "A");
        employee.commission_overrides.insert(
            "s1".to_string(),
            shared::CommissionOverride {
                commission_type: CommissionType::Percentage,
                commission_value: third,
            },
        );
        let state = TrackerState::new(
            vec![employee],
            vec![ServiceConfig {
                id: "s1".to_string(),
                label: "Massage".to_string(),
                amount: dec("199.99"),
                commission_type: CommissionType::Percentage,
                commission_value: third,
            }],
            vec![tx(
                "t1",
                "1",
                "2024-05-01",
                "199.99",
                &commission.to_string(),
                PaymentMethod::Cash,
            )],
        )
        .unwrap();

        let exported = service.snapshot_json(&state).unwrap();
        assert!(exported.json_content.contains(&commission.to_string()));

        let mut restored = create_test_state();
        service.restore_snapshot(&mut restored, &exported.json_content).unwrap();
        assert_eq!(restored.transactions()[0].commission, commission);
        assert_eq!(restored, state);
    }

    #[test]
    fn test_restore_keeps_collections_that_are_absent() {
        let service = ExportService::new();
        let mut state = create_test_state();
        let json = r#"{"transactions": [
            {"id": "n1", "employeeId": "1", "date": "2024-06-01", "amount": 98,
             "commission": 19.6, "paymentMethod": "ONLINE", "serviceLabel": "Foot"}
        ], "employees": null}"#;

        let response = service.restore_snapshot(&mut state, json).unwrap();
        assert_eq!(response.transactions_restored, 1);
        assert_eq!(response.employees_restored, None);
        assert_eq!(response.services_restored, None);
        assert_eq!(state.transactions()[0].commission, dec("19.6"));
        assert_eq!(state.employees().len(), 2);
        assert_eq!(state.services()[0].id, "s1");
    }

    #[test]
    fn test_malformed_snapshots_leave_state_untouched() {
        let service = ExportService::new();
        let mut state = create_test_state();
        let before = state.clone();

        let duplicate = r#"{"transactions": [
            {"id": "d", "employeeId": "1", "date": "2024-06-01", "amount": 1, "commission": 0, "paymentMethod": "CASH", "serviceLabel": "x"},
            {"id": "d", "employeeId": "1", "date": "2024-06-02", "amount": 1, "commission": 0, "paymentMethod": "CASH", "serviceLabel": "x"}
        ]}"#;
        let cases = [
            "not json",
            r#"{"employees": []}"#,
            r#"{"transactions": null}"#,
            r#"{"transactions": {}}"#,
            r#"{"transactions": [], "services": []}"#,
            r#"{"transactions": [{"id": "x", "date": "2024-13-01"}]}"#,
            duplicate,
        ];

        for json in cases {
            let err = service.restore_snapshot(&mut state, json).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<TrackerError>(),
                    Some(TrackerError::MalformedSnapshot(_))
                ),
                "expected malformed snapshot for {}",
                json
            );
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_write_to_path() {
        let service = ExportService::new();
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("exports");
        let quoted = format!("\"{}/\"", target.to_string_lossy());

        let path = service
            .write_to_path(Some(quoted.as_str()), "report.csv", "a,b\n")
            .unwrap();
        assert_eq!(path, target.join("report.csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");

        let full_path = target.join("report.csv").to_string_lossy().to_string();
        let again = service
            .write_to_path(Some(full_path.as_str()), "report.csv", "c,d\n")
            .unwrap();
        assert_eq!(again, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "c,d\n");
    }

    #[test]
    fn test_export_directory_expands_home() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(export_directory("'~/Payroll'"), home.join("Payroll"));
        assert_eq!(export_directory(" ~ "), home);
        assert_eq!(export_directory("~other/dir"), PathBuf::from("~other/dir"));
        assert_eq!(export_directory("  /srv/exports  "), PathBuf::from("/srv/exports"));
    }
}
