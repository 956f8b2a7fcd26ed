//! Filtering of the transaction list for the transactions page and exports.
//!
//! Filtering is a pure function over the in-memory transaction list rather
//! than a SQL query, so the same code path serves the transactions page, the
//! CSV export, and the PDF export.

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    category::CategoryId,
    transaction::{Transaction, TransactionKind},
};

/// Date format used by HTML date inputs, e.g. "2025-06-01".
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Which transaction kinds a filter keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    /// Keep both income and expense transactions.
    #[default]
    All,
    /// Keep only income transactions.
    Income,
    /// Keep only expense transactions.
    Expense,
}

impl KindFilter {
    /// The filter as the lowercase string used in query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            KindFilter::All => "all",
            KindFilter::Income => "income",
            KindFilter::Expense => "expense",
        }
    }

    fn matches(&self, kind: TransactionKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Income => kind == TransactionKind::Income,
            KindFilter::Expense => kind == TransactionKind::Expense,
        }
    }
}

/// The predicates applied to the transaction list.
///
/// A default filter matches every transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive text to look for in the title or description.
    pub search: String,
    /// Which transaction kinds to keep.
    pub kind: KindFilter,
    /// Keep only transactions with exactly this category.
    pub category_id: Option<CategoryId>,
    /// Keep only transactions on or after this date.
    pub date_from: Option<Date>,
    /// Keep only transactions on or before this date.
    pub date_to: Option<Date>,
}

/// Return the transactions that satisfy every predicate of `filter`.
///
/// The search string matches case-insensitively against the title or the
/// description; a transaction with no description can only match on its
/// title. An empty search matches everything. Input order is preserved.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &TransactionFilter,
) -> Vec<&'a Transaction> {
    let search = filter.search.trim().to_lowercase();

    transactions
        .iter()
        .filter(|transaction| matches_search(transaction, &search))
        .filter(|transaction| filter.kind.matches(transaction.kind))
        .filter(|transaction| {
            filter.category_id.is_none() || transaction.category_id == filter.category_id
        })
        .filter(|transaction| filter.date_from.is_none_or(|from| transaction.date >= from))
        .filter(|transaction| filter.date_to.is_none_or(|to| transaction.date <= to))
        .collect()
}

fn matches_search(transaction: &Transaction, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }

    if transaction.title.to_lowercase().contains(search) {
        return true;
    }

    transaction
        .description
        .as_ref()
        .is_some_and(|description| description.to_lowercase().contains(search))
}

/// The raw query parameters accepted by the transactions page and the export
/// endpoints.
///
/// Use [TransactionListParams::to_filter] to turn them into a
/// [TransactionFilter].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionListParams {
    /// Case-insensitive text to look for in the title or description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// One of "all", "income", or "expense".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Keep only transactions with exactly this category.
    ///
    /// Kept as a string because the page's category select submits an empty
    /// value for "All categories".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Keep only transactions on or after this date, e.g. "2025-06-01".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Keep only transactions on or before this date, e.g. "2025-06-30".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl TransactionListParams {
    /// Parse the raw query parameters into a [TransactionFilter].
    ///
    /// Unknown kind strings and unparseable dates are treated as if they
    /// were absent, so a hand-edited URL degrades to a wider view instead of
    /// an error page.
    pub fn to_filter(&self) -> TransactionFilter {
        let kind = match self.kind.as_deref() {
            None | Some("") | Some("all") => KindFilter::All,
            Some("income") => KindFilter::Income,
            Some("expense") => KindFilter::Expense,
            Some(other) => {
                tracing::warn!("Ignoring unknown kind filter {other:?}");
                KindFilter::All
            }
        };

        TransactionFilter {
            search: self.search.clone().unwrap_or_default(),
            kind,
            category_id: self.category_id(),
            date_from: parse_query_date(self.from.as_deref()),
            date_to: parse_query_date(self.to.as_deref()),
        }
    }

    /// The category filter as a parsed ID, if one is set.
    pub fn category_id(&self) -> Option<CategoryId> {
        let raw = self.category.as_deref()?.trim();

        if raw.is_empty() {
            return None;
        }

        match raw.parse() {
            Ok(category_id) => Some(category_id),
            Err(error) => {
                tracing::warn!("Ignoring unparseable category filter {raw:?}: {error}");
                None
            }
        }
    }

    /// Encode the parameters as a query string for links that must carry the
    /// current filter, e.g. the export buttons.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}

fn parse_query_date(raw: Option<&str>) -> Option<Date> {
    let raw = raw?.trim();

    if raw.is_empty() {
        return None;
    }

    match Date::parse(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(error) => {
            tracing::warn!("Ignoring unparseable date filter {raw:?}: {error}");
            None
        }
    }
}
