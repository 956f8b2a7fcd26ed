//! Core transaction domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserId, category::CategoryId};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether a transaction records money coming in or going out.
///
/// Amounts are stored as non-negative magnitudes, so the kind is the only
/// thing that distinguishes income from expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money was earned, e.g. a salary payment.
    Income,
    /// Money was spent, e.g. a grocery shop.
    Expense,
}

impl TransactionKind {
    /// The kind as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("\"{other}\" is not a valid transaction kind")),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that owns this transaction.
    pub user_id: UserId,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// A short title for the transaction, e.g. "Weekly groceries".
    pub title: String,
    /// An optional longer description.
    pub description: Option<String>,
    /// The amount of money spent or earned, always a non-negative magnitude.
    pub amount: f64,
    /// Whether money came in or went out.
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was first recorded.
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(title: &str, amount: f64, kind: TransactionKind, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            amount,
            kind,
            date,
            description: None,
            category_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The builder is finalized by [create_transaction](crate::transaction::create_transaction),
/// which validates the fields and inserts the row.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A short title for the transaction.
    pub title: String,
    /// The amount of money spent or earned, a non-negative magnitude.
    pub amount: f64,
    /// Whether money came in or went out.
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
    /// An optional longer description.
    pub description: Option<String>,
    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Check the invariants that must hold before the transaction is stored.
    ///
    /// # Errors
    /// Returns an:
    /// - [Error::EmptyTransactionTitle] if the title is empty or whitespace,
    /// - [Error::NegativeAmount] if the amount is negative.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::EmptyTransactionTitle);
        }

        if self.amount < 0.0 {
            return Err(Error::NegativeAmount(self.amount));
        }

        Ok(())
    }
}

#[cfg(test)]
mod transaction_kind_tests {
    use super::TransactionKind;

    #[test]
    fn round_trips_through_strings() {
        assert_eq!("income".parse(), Ok(TransactionKind::Income));
        assert_eq!("expense".parse(), Ok(TransactionKind::Expense));
        assert_eq!(TransactionKind::Income.as_str(), "income");
        assert_eq!(TransactionKind::Expense.as_str(), "expense");
    }

    #[test]
    fn rejects_unknown_strings() {
        assert!("transfer".parse::<TransactionKind>().is_err());
        assert!("Income".parse::<TransactionKind>().is_err());
    }
}

#[cfg(test)]
mod builder_tests {
    use time::macros::date;

    use crate::Error;

    use super::{Transaction, TransactionKind};

    #[test]
    fn validate_rejects_empty_title() {
        let builder = Transaction::build("  ", 1.0, TransactionKind::Expense, date!(2025 - 06 - 01));

        assert_eq!(builder.validate(), Err(Error::EmptyTransactionTitle));
    }

    #[test]
    fn validate_rejects_negative_amount() {
        let builder =
            Transaction::build("Coffee", -4.5, TransactionKind::Expense, date!(2025 - 06 - 01));

        assert_eq!(builder.validate(), Err(Error::NegativeAmount(-4.5)));
    }

    #[test]
    fn validate_accepts_zero_amount() {
        let builder =
            Transaction::build("Freebie", 0.0, TransactionKind::Income, date!(2025 - 06 - 01));

        assert_eq!(builder.validate(), Ok(()));
    }
}
