//! Core budget domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserId, category::CategoryId};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// The period a budget ceiling applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// The ceiling applies to a specific month of a specific year.
    Monthly,
    /// The ceiling applies to a whole year.
    ///
    /// Alert evaluation compares budgets by month AND year, so yearly
    /// budgets never produce alerts. This mirrors the upstream behaviour
    /// and is deliberately left unchanged, see DESIGN.md.
    Yearly,
}

impl BudgetPeriod {
    /// The period as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(format!("\"{other}\" is not a valid budget period")),
        }
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A spending ceiling for a category over a specific month/year or year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The ID of the user that owns this budget.
    pub user_id: UserId,
    /// The category the ceiling applies to. `None` means the budget is not
    /// tied to a concrete category; such budgets are never matched by the
    /// alert evaluator.
    pub category_id: Option<CategoryId>,
    /// The spending ceiling.
    pub amount: f64,
    /// Whether the ceiling applies to a month or a year.
    pub period: BudgetPeriod,
    /// The target month (1-12). Required when the period is monthly.
    pub month: Option<u8>,
    /// The target year.
    pub year: i32,
}

impl Budget {
    /// Create a new budget.
    ///
    /// Shortcut for [BudgetBuilder] for discoverability.
    pub fn build(amount: f64, period: BudgetPeriod, year: i32) -> BudgetBuilder {
        BudgetBuilder {
            amount,
            period,
            year,
            month: None,
            category_id: None,
        }
    }
}

/// A builder for creating [Budget] instances.
///
/// The builder is finalized by [create_budget](crate::budget::create_budget),
/// which validates the fields and inserts the row.
#[derive(Debug, PartialEq, Clone)]
pub struct BudgetBuilder {
    /// The spending ceiling.
    pub amount: f64,
    /// Whether the ceiling applies to a month or a year.
    pub period: BudgetPeriod,
    /// The target year.
    pub year: i32,
    /// The target month (1-12). Required when the period is monthly.
    pub month: Option<u8>,
    /// The category the ceiling applies to.
    pub category_id: Option<CategoryId>,
}

impl BudgetBuilder {
    /// Set the target month for the budget.
    pub fn month(mut self, month: Option<u8>) -> Self {
        self.month = month;
        self
    }

    /// Set the category for the budget.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Check the invariants that must hold before the budget is stored.
    ///
    /// # Errors
    /// Returns an:
    /// - [Error::NonPositiveBudgetAmount] if the ceiling is zero or negative,
    /// - [Error::MissingBudgetMonth] if the period is monthly and no month is set,
    /// - [Error::InvalidBudgetMonth] if the month is outside 1-12.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.amount <= 0.0 {
            return Err(Error::NonPositiveBudgetAmount(self.amount));
        }

        if let Some(month) = self.month
            && !(1..=12).contains(&month)
        {
            return Err(Error::InvalidBudgetMonth(month));
        }

        if self.period == BudgetPeriod::Monthly && self.month.is_none() {
            return Err(Error::MissingBudgetMonth);
        }

        Ok(())
    }
}
