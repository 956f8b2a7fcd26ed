//! Spendwise is a web app for tracking personal income and expenses.
//!
//! Users record transactions, organise them with categories, set monthly
//! budgets, view aggregate statistics and charts, and export their records
//! to CSV or PDF. This library provides a REST API that directly serves
//! HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use maud::Markup;
use tokio::signal;

mod alert;
mod auth;
mod budget;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod export;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod routing;
mod state;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use auth::{UserId, get_user_by_id};
pub use db::initialize as initialize_db;
pub use routing::build_router;
pub use state::AppState;

use crate::{
    alert::AlertView,
    budget::BudgetId,
    category::CategoryId,
    internal_server_error::{InternalServerErrorPage, render_internal_server_error},
    not_found::get_404_not_found_response,
    transaction::TransactionId,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address used to register already belongs to a user.
    #[error("a user with this email address already exists")]
    DuplicateEmail,

    /// The string used to register is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The string used to create a category color is not a hex color code.
    #[error("\"{0}\" is not a hex color code such as #3B82F6")]
    InvalidColor(String),

    /// An empty string was used to create a transaction title.
    #[error("Transaction title cannot be empty")]
    EmptyTransactionTitle,

    /// A negative amount was used to create a transaction.
    ///
    /// Amounts are stored as non-negative magnitudes. Whether money came in
    /// or went out is expressed by the transaction kind, never by the sign.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// The category ID used to create a transaction or budget did not match
    /// one of the user's categories.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A zero or negative ceiling was used to create a budget.
    #[error("{0} is not a valid budget ceiling, it must be greater than zero")]
    NonPositiveBudgetAmount(f64),

    /// A monthly budget was created without a target month.
    #[error("monthly budgets must have a target month")]
    MissingBudgetMonth,

    /// A month outside 1-12 was used to create a budget.
    #[error("{0} is not a valid month, expected a number from 1 to 12")]
    InvalidBudgetMonth(u8),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction(TransactionId),

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction(TransactionId),

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory(CategoryId),

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory(CategoryId),

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget(BudgetId),

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget(BudgetId),

    /// An error occurred while writing CSV output.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// An error occurred while writing PDF output.
    #[error("could not write PDF: {0}")]
    PdfError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPage {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertView::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                )
                .into_html(),
            ),
            Error::InvalidCategory(category_id) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid category ID",
                    &format!("Could not find a category with the ID {category_id:?}"),
                )
                .into_html(),
            ),
            Error::UpdateMissingTransaction(_) => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                )
                .into_html(),
            ),
            Error::DeleteMissingTransaction(_) => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                )
                .into_html(),
            ),
            Error::UpdateMissingCategory(_) => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not update category",
                    "The category could not be found.",
                )
                .into_html(),
            ),
            Error::DeleteMissingCategory(_) => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted.",
                )
                .into_html(),
            ),
            Error::UpdateMissingBudget(_) => render(
                StatusCode::NOT_FOUND,
                AlertView::error("Could not update budget", "The budget could not be found.")
                    .into_html(),
            ),
            Error::DeleteMissingBudget(_) => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete budget",
                    "The budget could not be found. \
                    Try refreshing the page to see if the budget has already been deleted.",
                )
                .into_html(),
            ),
            Error::DuplicateEmail => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Duplicate Email",
                    "A user with this email address already exists. \
                        Log in instead, or register with a different email address.",
                )
                .into_html(),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertView::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_html(),
            ),
        }
    }
}

fn render(status_code: StatusCode, markup: Markup) -> Response {
    (status_code, markup).into_response()
}
