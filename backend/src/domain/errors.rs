//! Error taxonomy for the commission tracker domain.

/// Failures raised by commission resolution, aggregation, settings edits and
/// snapshot restore. None of them is fatal to the session: the operation that
/// raised it is aborted and the in-memory state is left as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    #[error("Invalid service: {0}")]
    InvalidService(String),
    #[error("Unsupported commission type: {0}")]
    UnsupportedCommissionType(String),
    #[error("Cannot delete the last remaining service")]
    LastServiceDeletion,
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),
    #[error("Service not found: {0}")]
    ServiceNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No transactions recorded for {0}")]
    NoTransactionsForMonth(String),
}
