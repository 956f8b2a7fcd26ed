//! Aggregate statistics over the full transaction list.
//!
//! Totals cover the entire list regardless of any active filters; the
//! month-over-month trends compare the calendar month containing the
//! evaluation date with the month before it.

use time::{Date, Month};

use crate::transaction::{Transaction, TransactionKind};

/// Totals and trends for the dashboard's stat cards.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSummary {
    /// Sum of all income amounts, all time.
    pub total_income: f64,
    /// Sum of all expense amounts, all time.
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// Percentage change in income between the current and previous
    /// calendar month. 0 when the previous month had no income.
    pub income_trend: f64,
    /// Percentage change in expenses between the current and previous
    /// calendar month. 0 when the previous month had no expenses.
    pub expense_trend: f64,
}

/// Compute totals and month-over-month trends for `transactions`.
///
/// `today` determines which calendar month counts as "this month"; the
/// result is fully determined by the transaction list and this date.
pub fn summarize_transactions(transactions: &[Transaction], today: Date) -> TransactionSummary {
    let total_income = total_for_kind(transactions, TransactionKind::Income);
    let total_expense = total_for_kind(transactions, TransactionKind::Expense);

    let this_month = (today.month(), today.year());
    let last_month = previous_month(today.month(), today.year());

    let income_trend = trend_percentage(
        monthly_total(transactions, TransactionKind::Income, this_month),
        monthly_total(transactions, TransactionKind::Income, last_month),
    );
    let expense_trend = trend_percentage(
        monthly_total(transactions, TransactionKind::Expense, this_month),
        monthly_total(transactions, TransactionKind::Expense, last_month),
    );

    TransactionSummary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        income_trend,
        expense_trend,
    }
}

/// The calendar month immediately before `month`/`year`.
///
/// January rolls over to December of the previous year.
pub(super) fn previous_month(month: Month, year: i32) -> (Month, i32) {
    match month {
        Month::January => (Month::December, year - 1),
        _ => (month.previous(), year),
    }
}

fn total_for_kind(transactions: &[Transaction], kind: TransactionKind) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
        .map(|transaction| transaction.amount)
        .sum()
}

fn monthly_total(
    transactions: &[Transaction],
    kind: TransactionKind,
    (month, year): (Month, i32),
) -> f64 {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.kind == kind
                && transaction.date.month() == month
                && transaction.date.year() == year
        })
        .map(|transaction| transaction.amount)
        .sum()
}

/// `(current - previous) / previous * 100`, defined as 0 when `previous` is 0.
///
/// The zero case means a brand-new income source or spending category
/// reports 0% rather than infinity.
fn trend_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

#[cfg(test)]
mod summarize_transactions_tests {
    use time::{Date, Month, macros::date};

    use crate::{
        auth::UserId,
        transaction::{Transaction, TransactionKind},
    };

    use super::{previous_month, summarize_transactions};

    fn create_test_transaction(amount: f64, kind: TransactionKind, date: Date) -> Transaction {
        let timestamp = time::OffsetDateTime::UNIX_EPOCH;

        Transaction {
            id: 0,
            user_id: UserId::new(1),
            category_id: None,
            title: "Test".to_owned(),
            description: None,
            amount,
            kind,
            date,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    #[test]
    fn totals_cover_all_time() {
        let transactions = vec![
            create_test_transaction(2000.0, TransactionKind::Income, date!(2023 - 01 - 15)),
            create_test_transaction(100.0, TransactionKind::Income, date!(2025 - 03 - 01)),
            create_test_transaction(800.0, TransactionKind::Expense, date!(2024 - 07 - 20)),
            create_test_transaction(50.0, TransactionKind::Expense, date!(2025 - 03 - 10)),
        ];

        let summary = summarize_transactions(&transactions, date!(2025 - 03 - 15));

        assert_eq!(summary.total_income, 2100.0);
        assert_eq!(summary.total_expense, 850.0);
    }

    #[test]
    fn balance_is_income_minus_expense() {
        let transactions = vec![
            create_test_transaction(2000.0, TransactionKind::Income, date!(2025 - 03 - 01)),
            create_test_transaction(800.0, TransactionKind::Expense, date!(2025 - 03 - 10)),
        ];

        let summary = summarize_transactions(&transactions, date!(2025 - 03 - 15));

        assert_eq!(summary.balance, summary.total_income - summary.total_expense);
        assert_eq!(summary.balance, 1200.0);
    }

    #[test]
    fn empty_list_produces_zeros() {
        let summary = summarize_transactions(&[], date!(2025 - 03 - 15));

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expense, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.income_trend, 0.0);
        assert_eq!(summary.expense_trend, 0.0);
    }

    #[test]
    fn income_trend_compares_this_month_to_last() {
        // March income 2000 vs February income 1800 is an 11.1% increase.
        let transactions = vec![
            create_test_transaction(2000.0, TransactionKind::Income, date!(2025 - 03 - 05)),
            create_test_transaction(1800.0, TransactionKind::Income, date!(2025 - 02 - 05)),
        ];

        let summary = summarize_transactions(&transactions, date!(2025 - 03 - 15));

        assert!(
            (summary.income_trend - 100.0 / 9.0).abs() < 1e-9,
            "got {}",
            summary.income_trend
        );
    }

    #[test]
    fn trend_is_zero_when_last_month_is_zero() {
        let transactions = vec![create_test_transaction(
            2000.0,
            TransactionKind::Income,
            date!(2025 - 03 - 05),
        )];

        let summary = summarize_transactions(&transactions, date!(2025 - 03 - 15));

        assert_eq!(summary.income_trend, 0.0);
    }

    #[test]
    fn trend_is_negative_when_spending_drops() {
        let transactions = vec![
            create_test_transaction(500.0, TransactionKind::Expense, date!(2025 - 03 - 05)),
            create_test_transaction(1000.0, TransactionKind::Expense, date!(2025 - 02 - 05)),
        ];

        let summary = summarize_transactions(&transactions, date!(2025 - 03 - 15));

        assert_eq!(summary.expense_trend, -50.0);
    }

    #[test]
    fn january_compares_against_december_of_previous_year() {
        let transactions = vec![
            create_test_transaction(1100.0, TransactionKind::Income, date!(2025 - 01 - 05)),
            create_test_transaction(1000.0, TransactionKind::Income, date!(2024 - 12 - 05)),
        ];

        let summary = summarize_transactions(&transactions, date!(2025 - 01 - 15));

        assert!(
            (summary.income_trend - 10.0).abs() < 1e-9,
            "got {}",
            summary.income_trend
        );
    }

    #[test]
    fn trends_ignore_other_months() {
        let transactions = vec![
            create_test_transaction(2000.0, TransactionKind::Income, date!(2025 - 03 - 05)),
            create_test_transaction(1800.0, TransactionKind::Income, date!(2025 - 02 - 05)),
            create_test_transaction(99999.0, TransactionKind::Income, date!(2024 - 03 - 05)),
            create_test_transaction(12345.0, TransactionKind::Income, date!(2025 - 01 - 05)),
        ];

        let summary = summarize_transactions(&transactions, date!(2025 - 03 - 15));

        assert!(
            (summary.income_trend - 100.0 / 9.0).abs() < 1e-9,
            "got {}",
            summary.income_trend
        );
    }

    #[test]
    fn same_inputs_produce_same_summary() {
        let transactions = vec![
            create_test_transaction(2000.0, TransactionKind::Income, date!(2025 - 03 - 05)),
            create_test_transaction(800.0, TransactionKind::Expense, date!(2025 - 03 - 10)),
        ];

        let first = summarize_transactions(&transactions, date!(2025 - 03 - 15));
        let second = summarize_transactions(&transactions, date!(2025 - 03 - 15));

        assert_eq!(first, second);
    }

    #[test]
    fn previous_month_rolls_over_year_boundary() {
        assert_eq!(previous_month(Month::January, 2025), (Month::December, 2024));
        assert_eq!(previous_month(Month::March, 2025), (Month::February, 2025));
    }
}
