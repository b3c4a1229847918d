//! Read views built from the transaction history: dashboard, payroll report
//! and daily reconciliation.
//!
//! Every view is recomputed from the current state on each call. Nothing is
//! cached between calls since transactions may have changed in between.

use shared::{
    ActivityEntry, DashboardView, MonthlyReport, MonthlySummary, ReconciliationView,
    SummaryTotals, Transaction,
};

use super::aggregation::{aggregate_by_day, aggregate_by_employee, MonthFilter};
use super::money::format_currency;
use super::state::TrackerState;

/// Size of the dashboard's recent activity feed
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Clone, Default)]
pub struct SummaryBuilder {}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self {}
    }

    /// Grand totals over a set of monthly summaries
    pub fn totals(&self, summaries: &[MonthlySummary]) -> SummaryTotals {
        summaries.iter().fold(SummaryTotals::default(), |mut totals, summary| {
            totals.amount += summary.total_amount;
            totals.commission += summary.total_commission;
            totals.online += summary.total_online;
            totals.cash += summary.total_cash;
            totals
        })
    }

    /// Summaries ranked by total amount, highest first. Ties keep their input
    /// (employee list) order.
    pub fn leaderboard(&self, mut summaries: Vec<MonthlySummary>) -> Vec<MonthlySummary> {
        summaries.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
        summaries
    }

    /// The most recently created transactions, newest first
    pub fn recent_activity(&self, transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
        transactions.iter().take(limit).cloned().collect()
    }

    pub fn dashboard(&self, state: &TrackerState, month: &MonthFilter) -> DashboardView {
        let summaries = aggregate_by_employee(state.transactions(), state.employees(), month);
        let totals = self.totals(&summaries);

        let recent_activity = self
            .recent_activity(state.transactions(), RECENT_ACTIVITY_LIMIT)
            .into_iter()
            .map(|tx| ActivityEntry {
                employee_name: state.employee(&tx.employee_id).map(|e| e.name.clone()),
                formatted_amount: format_currency(tx.amount),
                transaction_id: tx.id,
                date: tx.date,
                employee_id: tx.employee_id,
                service_label: tx.service_label,
                amount: tx.amount,
                payment_method: tx.payment_method,
            })
            .collect();

        DashboardView {
            month: month.to_string(),
            totals,
            leaderboard: self.leaderboard(summaries),
            recent_activity,
        }
    }

    pub fn monthly_report(&self, state: &TrackerState, month: &MonthFilter) -> MonthlyReport {
        let summaries = aggregate_by_employee(state.transactions(), state.employees(), month);
        let totals = self.totals(&summaries);
        let transactions = state
            .transactions()
            .iter()
            .filter(|tx| month.matches(tx.date))
            .cloned()
            .collect();

        MonthlyReport {
            month: month.to_string(),
            summaries: self.leaderboard(summaries),
            totals,
            transactions,
        }
    }

    pub fn reconciliation(&self, state: &TrackerState) -> ReconciliationView {
        ReconciliationView {
            days: aggregate_by_day(state.transactions(), state.employees()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::{CommissionType, Employee, PaymentMethod, ServiceConfig};
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn tx(
        id: &str,
        employee_id: &str,
        day: &str,
        amount: &str,
        method: PaymentMethod,
    ) -> Transaction {
        Transaction {
            id: id.to_string(),
            employee_id: employee_id.to_string(),
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            amount: dec(amount),
            commission: dec(amount) * dec("0.2"),
            payment_method: method,
            service_label: "Service".to_string(),
        }
    }

    fn create_test_state(transactions: Vec<Transaction>) -> TrackerState {
        TrackerState::new(
            vec![Employee::new("1", "A"), Employee::new("2", "B"), Employee::new("3", "C")],
            vec![ServiceConfig {
                id: "s1".to_string(),
                label: "Service".to_string(),
                amount: dec("100"),
                commission_type: CommissionType::Percentage,
                commission_value: dec("0.2"),
            }],
            transactions,
        )
        .unwrap()
    }

    #[test]
    fn test_leaderboard_ranks_by_amount_with_stable_ties() {
        let state = create_test_state(vec![
            tx("t1", "3", "2024-05-02", "200", PaymentMethod::Online),
            tx("t2", "2", "2024-05-01", "50", PaymentMethod::Cash),
            tx("t3", "1", "2024-05-01", "50", PaymentMethod::Online),
        ]);
        let month = MonthFilter::parse("2024-05").unwrap();
        let builder = SummaryBuilder::new();

        let summaries = aggregate_by_employee(state.transactions(), state.employees(), &month);
        let ranked = builder.leaderboard(summaries);
        let order: Vec<&str> = ranked.iter().map(|s| s.employee_id.as_str()).collect();
        assert_eq!(order, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_totals_roll_up_all_employees() {
        let state = create_test_state(vec![
            tx("t1", "1", "2024-05-02", "100", PaymentMethod::Online),
            tx("t2", "2", "2024-05-01", "48", PaymentMethod::Cash),
            tx("t3", "2", "2024-04-30", "500", PaymentMethod::Cash),
        ]);
        let month = MonthFilter::parse("2024-05").unwrap();
        let report = SummaryBuilder::new().monthly_report(&state, &month);

        assert_eq!(report.month, "2024-05");
        assert_eq!(report.totals.amount, dec("148"));
        assert_eq!(report.totals.online, dec("100"));
        assert_eq!(report.totals.cash, dec("48"));
        assert_eq!(report.totals.commission, dec("29.6"));
        assert_eq!(report.summaries.len(), 3);
        assert_eq!(report.transactions.len(), 2);
        assert_eq!(report.transactions[0].id, "t1");
    }

    #[test]
    fn test_dashboard_recent_activity_follows_creation_order() {
        let mut transactions: Vec<Transaction> = (0..12)
            .map(|i| tx(&format!("t{}", i), "1", "2024-05-01", "10", PaymentMethod::Cash))
            .collect();
        transactions.insert(0, tx("latest", "ghost", "2024-04-01", "99", PaymentMethod::Online));
        let state = create_test_state(transactions);

        let view = SummaryBuilder::new().dashboard(&state, &MonthFilter::parse("2024-05").unwrap());
        assert_eq!(view.recent_activity.len(), RECENT_ACTIVITY_LIMIT);
        let newest = &view.recent_activity[0];
        assert_eq!(newest.transaction_id, "latest");
        assert_eq!(newest.employee_name, None);
        assert_eq!(newest.formatted_amount, "¥99.00");
        assert_eq!(view.recent_activity[1].employee_name.as_deref(), Some("A"));

        assert_eq!(view.totals.amount, dec("120"));
        assert_eq!(view.leaderboard[0].employee_id, "1");
    }

    #[test]
    fn test_reconciliation_view() {
        let state = create_test_state(vec![
            tx("t1", "1", "2024-05-02", "100", PaymentMethod::Online),
            tx("t2", "2", "2024-05-01", "48", PaymentMethod::Cash),
        ]);
        let view = SummaryBuilder::new().reconciliation(&state);
        assert_eq!(view.days.len(), 2);
        assert_eq!(view.days[0].total, dec("100"));
        assert_eq!(view.days[1].employee("2").unwrap().cash, dec("48"));
    }
}
