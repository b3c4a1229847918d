//! Domain-level command and query types.
//! These structs are the inputs of the domain services; callers build them
//! from whatever the user selected.

pub mod transactions {
    use chrono::NaiveDate;
    use shared::PaymentMethod;

    /// Input for recording a sale.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionCommand {
        pub employee_id: String,
        pub service_id: String,
        pub date: NaiveDate,
        pub payment_method: PaymentMethod,
    }

    /// Filters for listing transactions. Dates are inclusive.
    #[derive(Debug, Clone, Default)]
    pub struct TransactionListQuery {
        pub employee_id: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub limit: Option<usize>,
    }
}

pub mod settings {
    use rust_decimal::Decimal;
    use shared::CommissionType;

    /// Partial update of a service; `None` fields are left as they are.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateServiceCommand {
        pub label: Option<String>,
        pub amount: Option<Decimal>,
        pub commission_type: Option<CommissionType>,
        pub commission_value: Option<Decimal>,
    }

    /// Input for giving an employee a custom commission on one service.
    #[derive(Debug, Clone)]
    pub struct SetCommissionOverrideCommand {
        pub employee_id: String,
        pub service_id: String,
        pub commission_type: CommissionType,
        pub commission_value: Decimal,
    }
}
