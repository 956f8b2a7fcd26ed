//! Transaction edit page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    auth::UserId,
    category::{Category, get_categories_by_user},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    transaction::{
        Transaction, TransactionBuilder, TransactionId,
        create::{TransactionFormData, parse_transaction_form, transaction_form_fields},
        get_transaction, update_transaction,
    },
};

/// The state needed for editing a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the transaction edit page.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionEndpointState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    let categories = get_categories_by_user(user_id, &connection)?;

    Ok(edit_transaction_view(&transaction, &categories).into_response())
}

/// Handle transaction edit form submission.
pub async fn update_transaction_endpoint(
    State(state): State<EditTransactionEndpointState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let builder = match parse_transaction_form(&form) {
        Ok(builder) => builder,
        Err(message) => {
            return edit_transaction_form_view(transaction_id, None, &[], &format!("Error: {message}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_transaction(transaction_id, builder.clone(), user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::EmptyTransactionTitle
            | Error::NegativeAmount(_)
            | Error::InvalidCategory(_)),
        ) => edit_transaction_form_view(
            transaction_id,
            Some(&builder),
            &[],
            &format!("Error: {error}"),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

fn edit_transaction_view(transaction: &Transaction, categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let builder = TransactionBuilder {
        title: transaction.title.clone(),
        amount: transaction.amount,
        kind: transaction.kind,
        date: transaction.date,
        description: transaction.description.clone(),
        category_id: transaction.category_id,
    };
    let form = edit_transaction_form_view(transaction.id, Some(&builder), categories, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}

fn edit_transaction_form_view(
    transaction_id: TransactionId,
    builder: Option<&TransactionBuilder>,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TRANSACTION, transaction_id);

    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (transaction_form_fields(builder, categories))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Transaction" }
        }
    }
}
