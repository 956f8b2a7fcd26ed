//! Download endpoints for the CSV and PDF exports.
//!
//! Both endpoints accept the same query parameters as the transactions page
//! and apply the same filter, so the exported file matches the view the
//! user requested it from.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::UserId,
    category::{Category, get_categories_by_user},
    export::{transactions_to_csv, transactions_to_pdf},
    timezone::get_local_offset,
    transaction::{Transaction, TransactionListParams, filter_transactions, get_transactions_by_user},
};

/// The state needed for the export endpoints.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Download the filtered transaction view as a CSV file.
pub async fn export_csv_endpoint(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserId>,
    Query(params): Query<TransactionListParams>,
) -> Result<Response, Error> {
    let (transactions, categories, today) = fetch_export_data(&state, user_id)?;

    let filter = params.to_filter();
    let visible = filter_transactions(&transactions, &filter);

    let csv = transactions_to_csv(&visible, &categories)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"expenses_{today}.csv\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Download the filtered transaction view as a PDF file.
pub async fn export_pdf_endpoint(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserId>,
    Query(params): Query<TransactionListParams>,
) -> Result<Response, Error> {
    let (transactions, categories, today) = fetch_export_data(&state, user_id)?;

    let filter = params.to_filter();
    let visible = filter_transactions(&transactions, &filter);

    let pdf = transactions_to_pdf(&visible, &categories, today)?;

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"expenses_{today}.pdf\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

fn fetch_export_data(
    state: &ExportState,
    user_id: UserId,
) -> Result<(Vec<Transaction>, Vec<Category>, Date), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_by_user(user_id, &connection)?;
    let categories = get_categories_by_user(user_id, &connection)?;

    let offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(offset).date();

    Ok((transactions, categories, today))
}
