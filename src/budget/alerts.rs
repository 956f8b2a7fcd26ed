//! Budget alert evaluation.
//!
//! A pure function compares per-category spending against the budgets
//! configured for the current month and emits alerts once spending reaches
//! [ALERT_THRESHOLD_PERCENT] of the ceiling. Alerts a user has dismissed
//! are suppressed via a caller-supplied set of budget IDs, which keeps the
//! evaluator free of session state and easy to test.

use std::collections::{HashMap, HashSet};

use time::Month;

use crate::{
    budget::{Budget, BudgetId},
    category::{Category, CategoryId},
    transaction::{Transaction, TransactionKind},
};

/// Spending percentage at which an alert is emitted.
pub const ALERT_THRESHOLD_PERCENT: f64 = 80.0;

/// The label shown when a budget references a category that no longer exists.
const UNRESOLVED_CATEGORY_LABEL: &str = "Unknown";

/// How urgently an alert should be presented.
///
/// The severity is derived from the percentage alone, it is not stored
/// anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    /// Spending is at or above the threshold but below the ceiling.
    Warning,
    /// Spending has reached or passed the ceiling.
    Exceeded,
}

/// An active budget alert for display.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    /// The budget the alert belongs to. Dismissals are keyed by this ID.
    pub budget_id: BudgetId,
    /// The display name of the budget's category, or a fallback label if
    /// the category no longer exists.
    pub category_name: String,
    /// The amount spent on the category this month.
    pub spent: f64,
    /// The budget ceiling.
    pub budget: f64,
    /// Spending as a percentage of the ceiling.
    pub percentage: f64,
}

impl BudgetAlert {
    /// How urgently this alert should be presented.
    pub fn severity(&self) -> AlertSeverity {
        if self.percentage >= 100.0 {
            AlertSeverity::Exceeded
        } else {
            AlertSeverity::Warning
        }
    }
}

/// Evaluate the budget alerts to display for the month containing the
/// evaluation date.
///
/// Only budgets whose target month and year equal `month` and `year` are
/// considered; yearly budgets carry no month and therefore never match (see
/// DESIGN.md). Budgets without a concrete category reference are skipped.
/// Spending is the sum of expense-kind amounts on the budget's category
/// dated within the month. An alert is emitted when spending reaches
/// [ALERT_THRESHOLD_PERCENT] of the ceiling and the budget's ID is not in
/// `dismissed`.
///
/// Dismissal is monotonic for a session: the evaluator never expires
/// entries in `dismissed`, so a dismissed alert only reappears with a fresh
/// session or a changed budget.
pub fn evaluate_budget_alerts(
    budgets: &[Budget],
    transactions: &[Transaction],
    categories: &[Category],
    month: Month,
    year: i32,
    dismissed: &HashSet<BudgetId>,
) -> Vec<BudgetAlert> {
    let category_names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    let mut alerts = Vec::new();

    for budget in budgets {
        let Some(category_id) = budget.category_id else {
            continue;
        };

        if budget.month != Some(u8::from(month)) || budget.year != year {
            continue;
        }

        if dismissed.contains(&budget.id) {
            continue;
        }

        let spent: f64 = transactions
            .iter()
            .filter(|transaction| {
                transaction.kind == TransactionKind::Expense
                    && transaction.category_id == Some(category_id)
                    && transaction.date.month() == month
                    && transaction.date.year() == year
            })
            .map(|transaction| transaction.amount)
            .sum();

        let percentage = spent / budget.amount * 100.0;

        if percentage < ALERT_THRESHOLD_PERCENT {
            continue;
        }

        let category_name = category_names
            .get(&category_id)
            .copied()
            .unwrap_or(UNRESOLVED_CATEGORY_LABEL)
            .to_owned();

        alerts.push(BudgetAlert {
            budget_id: budget.id,
            category_name,
            spent,
            budget: budget.amount,
            percentage,
        });
    }

    alerts
}
