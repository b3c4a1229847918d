//! Transaction aggregation by employee, month and day.
//!
//! Both aggregations zero-fill: every known employee appears in the output
//! even when no transaction matches, so report and reconciliation rows stay
//! stable. Sums are exact decimal additions.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use shared::{
    DayTotals, Employee, EmployeeDayTotals, MonthlySummary, PaymentMethod, Transaction,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use super::errors::TrackerError;

/// Number of days returned by the rolling reconciliation view
pub const RECONCILIATION_DAY_LIMIT: usize = 31;

/// A calendar year-month (`YYYY-MM`) selecting the transactions of one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthFilter {
    year: i32,
    month: u32,
}

impl MonthFilter {
    pub fn new(year: i32, month: u32) -> Result<Self, TrackerError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(TrackerError::InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Parse a `YYYY-MM` string
    pub fn parse(raw: &str) -> Result<Self, TrackerError> {
        let invalid = || TrackerError::InvalidMonth(raw.to_string());
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthFilter {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Per-employee monthly totals, one row per employee in employee list order.
///
/// The rows are not ranked; callers that need a leaderboard sort them.
pub fn aggregate_by_employee(
    transactions: &[Transaction],
    employees: &[Employee],
    month: &MonthFilter,
) -> Vec<MonthlySummary> {
    let monthly: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| month.matches(tx.date))
        .collect();

    employees
        .iter()
        .map(|employee| {
            let mut summary = MonthlySummary::empty(employee);
            for tx in monthly.iter().filter(|tx| tx.employee_id == employee.id) {
                match tx.payment_method {
                    PaymentMethod::Online => summary.total_online += tx.amount,
                    PaymentMethod::Cash => summary.total_cash += tx.amount,
                }
                summary.total_amount += tx.amount;
                summary.total_commission += tx.commission;
            }
            summary
        })
        .collect()
}

/// Daily totals over the full history, most recent day first, capped to
/// [`RECONCILIATION_DAY_LIMIT`] days.
pub fn aggregate_by_day(transactions: &[Transaction], employees: &[Employee]) -> Vec<DayTotals> {
    aggregate_by_day_with_limit(transactions, employees, RECONCILIATION_DAY_LIMIT)
}

/// Same as [`aggregate_by_day`] with an explicit day cap.
///
/// Day totals include every transaction of the day; the per-employee breakdown
/// only covers known employees, so a transaction whose employee no longer
/// exists counts towards the day but towards no employee.
pub fn aggregate_by_day_with_limit(
    transactions: &[Transaction],
    employees: &[Employee],
    limit: usize,
) -> Vec<DayTotals> {
    let positions: HashMap<&str, usize> = employees
        .iter()
        .enumerate()
        .map(|(index, employee)| (employee.id.as_str(), index))
        .collect();

    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for tx in transactions {
        let day = days.entry(tx.date).or_insert_with(|| empty_day(tx.date, employees));

        let (online, cash) = match tx.payment_method {
            PaymentMethod::Online => (tx.amount, Decimal::ZERO),
            PaymentMethod::Cash => (Decimal::ZERO, tx.amount),
        };
        day.online += online;
        day.cash += cash;
        day.total += tx.amount;

        if let Some(&index) = positions.get(tx.employee_id.as_str()) {
            let share = &mut day.employees[index];
            share.online += online;
            share.cash += cash;
            share.total += tx.amount;
        }
    }

    days.into_values().rev().take(limit).collect()
}

fn empty_day(date: NaiveDate, employees: &[Employee]) -> DayTotals {
    DayTotals {
        date,
        online: Decimal::ZERO,
        cash: Decimal::ZERO,
        total: Decimal::ZERO,
        employees: employees
            .iter()
            .map(|employee| EmployeeDayTotals {
                employee_id: employee.id.clone(),
                employee_name: employee.name.clone(),
                online: Decimal::ZERO,
                cash: Decimal::ZERO,
                total: Decimal::ZERO,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

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
            date: date(day),
            amount: dec(amount),
            commission: dec(commission),
            payment_method: method,
            service_label: "Service".to_string(),
        }
    }

    fn employees() -> Vec<Employee> {
        vec![Employee::new("1", "A"), Employee::new("2", "B"), Employee::new("3", "C")]
    }

    #[test]
    fn test_month_filter_parsing() {
        let month = MonthFilter::parse("2024-05").unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 5);
        assert_eq!(month.to_string(), "2024-05");

        for raw in ["2024-13", "2024-00", "2024-5", "24-05", "2024/05", "", "abcd-ef"] {
            assert!(
                matches!(MonthFilter::parse(raw), Err(TrackerError::InvalidMonth(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_month_filter_matches_only_its_month() {
        let month = MonthFilter::parse("2024-05").unwrap();
        assert!(month.matches(date("2024-05-01")));
        assert!(month.matches(date("2024-05-31")));
        assert!(!month.matches(date("2024-04-30")));
        assert!(!month.matches(date("2023-05-15")));
    }

    #[test]
    fn test_single_transaction_summary() {
        let employees = vec![Employee::new("1", "A")];
        let transactions = vec![tx("t1", "1", "2024-05-01", "100", "20", PaymentMethod::Online)];
        let month = MonthFilter::parse("2024-05").unwrap();

        let summaries = aggregate_by_employee(&transactions, &employees, &month);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.employee_name, "A");
        assert_eq!(summary.total_amount, dec("100"));
        assert_eq!(summary.total_online, dec("100"));
        assert_eq!(summary.total_cash, Decimal::ZERO);
        assert_eq!(summary.total_commission, dec("20"));
    }

    #[test]
    fn test_zero_fill_for_empty_month() {
        let transactions = vec![tx("t1", "1", "2024-04-10", "100", "20", PaymentMethod::Cash)];
        let month = MonthFilter::parse("2024-05").unwrap();

        let summaries = aggregate_by_employee(&transactions, &employees(), &month);
        assert_eq!(summaries.len(), 3);
        for summary in &summaries {
            assert_eq!(summary.total_amount, Decimal::ZERO);
            assert_eq!(summary.total_commission, Decimal::ZERO);
        }
        let ids: Vec<&str> = summaries.iter().map(|s| s.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_monthly_totals_are_complete() {
        let transactions = vec![
            tx("t1", "1", "2024-05-01", "128", "25.6", PaymentMethod::Online),
            tx("t2", "1", "2024-05-02", "48", "5", PaymentMethod::Cash),
            tx("t3", "2", "2024-05-02", "158", "31.6", PaymentMethod::Cash),
            tx("t4", "3", "2024-06-01", "198", "39.6", PaymentMethod::Online),
            tx("t5", "2", "2024-05-31", "0.1", "0.02", PaymentMethod::Online),
            tx("t6", "2", "2024-05-31", "0.2", "0.04", PaymentMethod::Online),
        ];
        let month = MonthFilter::parse("2024-05").unwrap();
        let summaries = aggregate_by_employee(&transactions, &employees(), &month);

        let summed: Decimal = summaries.iter().map(|s| s.total_amount).sum();
        let expected: Decimal = transactions
            .iter()
            .filter(|t| month.matches(t.date))
            .map(|t| t.amount)
            .sum();
        assert_eq!(summed, expected);
        assert_eq!(summed, dec("334.3"));

        let b = &summaries[1];
        assert_eq!(b.total_cash, dec("158"));
        assert_eq!(b.total_online, dec("0.3"));
        assert_eq!(b.total_amount, b.total_cash + b.total_online);
        assert_eq!(b.total_commission, dec("31.66"));
    }

    #[test]
    fn test_unknown_employee_is_not_summarised() {
        let transactions =
            vec![tx("t1", "ghost", "2024-05-01", "100", "20", PaymentMethod::Online)];
        let month = MonthFilter::parse("2024-05").unwrap();
        let summaries = aggregate_by_employee(&transactions, &employees(), &month);
        assert!(summaries.iter().all(|s| s.total_amount == Decimal::ZERO));
    }

    #[test]
    fn test_daily_groups_sorted_most_recent_first() {
        let transactions = vec![
            tx("t1", "1", "2024-05-01", "100", "20", PaymentMethod::Online),
            tx("t2", "2", "2024-05-03", "50", "5", PaymentMethod::Cash),
            tx("t3", "1", "2024-05-03", "30", "6", PaymentMethod::Online),
            tx("t4", "ghost", "2024-05-02", "10", "1", PaymentMethod::Cash),
        ];
        let days = aggregate_by_day(&transactions, &employees());

        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date("2024-05-03"), date("2024-05-02"), date("2024-05-01")]);

        let busiest = &days[0];
        assert_eq!(busiest.online, dec("30"));
        assert_eq!(busiest.cash, dec("50"));
        assert_eq!(busiest.total, dec("80"));
        assert_eq!(busiest.employees.len(), 3);
        assert_eq!(busiest.employee("1").unwrap().online, dec("30"));
        assert_eq!(busiest.employee("2").unwrap().cash, dec("50"));
        assert_eq!(busiest.employee("3").unwrap().total, Decimal::ZERO);

        let orphan_day = &days[1];
        assert_eq!(orphan_day.total, dec("10"));
        assert!(orphan_day.employees.iter().all(|e| e.total == Decimal::ZERO));
    }

    #[test]
    fn test_daily_groups_are_capped() {
        let start = date("2024-01-01");
        let transactions: Vec<Transaction> = (0..40)
            .map(|offset| {
                let day = start + chrono::Duration::days(offset);
                tx(&format!("t{}", offset), "1", &day.to_string(), "10", "1", PaymentMethod::Cash)
            })
            .collect();

        let days = aggregate_by_day(&transactions, &employees());
        assert_eq!(days.len(), RECONCILIATION_DAY_LIMIT);
        assert_eq!(days[0].date, start + chrono::Duration::days(39));
        assert_eq!(days[30].date, start + chrono::Duration::days(9));

        let everything = aggregate_by_day_with_limit(&transactions, &employees(), usize::MAX);
        assert_eq!(everything.len(), 40);
    }
}
