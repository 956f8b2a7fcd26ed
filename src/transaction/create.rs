//! Transaction creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    auth::UserId,
    category::{Category, get_categories_by_user},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
    transaction::{Transaction, TransactionBuilder, TransactionKind, filter::DATE_FORMAT},
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Form data for transaction creation and editing.
#[derive(Debug, Deserialize)]
pub struct TransactionFormData {
    pub title: String,
    pub amount: f64,
    pub kind: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
    /// The category ID as a string; an empty string means no category.
    #[serde(default)]
    pub category_id: String,
}

/// Parse the raw form fields into a [TransactionBuilder].
///
/// Returns a user-facing message when a field cannot be parsed. Invariants
/// such as the non-negative amount are checked when the builder is stored.
pub(super) fn parse_transaction_form(
    form: &TransactionFormData,
) -> Result<TransactionBuilder, String> {
    let kind = form.kind.parse::<TransactionKind>()?;

    let date = Date::parse(&form.date, DATE_FORMAT)
        .map_err(|_| format!("\"{}\" is not a valid date", form.date))?;

    let description = if form.description.trim().is_empty() {
        None
    } else {
        Some(form.description.trim().to_owned())
    };

    let category_id = if form.category_id.is_empty() {
        None
    } else {
        Some(
            form.category_id
                .parse()
                .map_err(|_| format!("\"{}\" is not a valid category", form.category_id))?,
        )
    };

    Ok(Transaction::build(&form.title, form.amount, kind, date)
        .description(description)
        .category_id(category_id))
}

/// Render the transaction creation page.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories_by_user(user_id, &connection)?;

    Ok(new_transaction_view(&categories).into_response())
}

/// Handle transaction creation form submission.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let builder = match parse_transaction_form(&form) {
        Ok(builder) => builder,
        Err(message) => {
            return new_transaction_form_view(&[], &format!("Error: {message}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match crate::transaction::create_transaction(builder, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::EmptyTransactionTitle
            | Error::NegativeAmount(_)
            | Error::InvalidCategory(_)),
        ) => new_transaction_form_view(&[], &format!("Error: {error}")).into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

/// Shared form fields for the create and edit pages.
pub(super) fn transaction_form_fields(
    builder: Option<&TransactionBuilder>,
    categories: &[Category],
) -> Markup {
    let title = builder.map(|b| b.title.as_str()).unwrap_or_default();
    let amount = builder.map(|b| format!("{:.2}", b.amount));
    let kind = builder.map(|b| b.kind).unwrap_or(TransactionKind::Expense);
    let date = builder.map(|b| b.date.to_string());
    let description = builder
        .and_then(|b| b.description.as_deref())
        .unwrap_or_default();
    let category_id = builder.and_then(|b| b.category_id);

    html! {
        div
        {
            label for="title" class=(FORM_LABEL_STYLE) { "Title" }

            input
                id="title"
                type="text"
                name="title"
                placeholder="Weekly groceries"
                required
                autofocus
                value=(title)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            div class="input-wrapper w-full"
            {
                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="0"
                    step="0.01"
                    required
                    value=[amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { "Kind" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for (value, label) in [("expense", "Expense"), ("income", "Income")] {
                    div class="flex items-center gap-2"
                    {
                        input
                            id=(format!("kind-{value}"))
                            type="radio"
                            name="kind"
                            value=(value)
                            checked[kind.as_str() == value]
                            class=(FORM_RADIO_INPUT_STYLE);

                        label
                            for=(format!("kind-{value}"))
                            class=(FORM_RADIO_LABEL_STYLE)
                        {
                            (label)
                        }
                    }
                }
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                id="date"
                type="date"
                name="date"
                required
                value=[date]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

            select
                id="category_id"
                name="category_id"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[category_id.is_none()] { "Uncategorized" }

                @for category in categories {
                    option
                        value=(category.id)
                        selected[category_id == Some(category.id)]
                    {
                        (category.name) " (" (category.kind) ")"
                    }
                }
            }
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description (optional)" }

            textarea
                id="description"
                name="description"
                rows="3"
                placeholder="Anything worth remembering about this transaction"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                (description)
            }
        }
    }
}

fn new_transaction_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = new_transaction_form_view(categories, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Add Transaction", &[dollar_input_styles()], &content)
}

fn new_transaction_form_view(categories: &[Category], error_message: &str) -> Markup {
    let create_transaction_endpoint = endpoints::POST_TRANSACTION;

    html! {
        form
            hx-post=(create_transaction_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (transaction_form_fields(None, categories))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
        }
    }
}

#[cfg(test)]
mod new_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::{CreateTransactionEndpointState, get_create_transaction_page};

    fn get_page_state() -> (UserId, CreateTransactionEndpointState) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let user = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2".to_string()),
            &connection,
        )
        .unwrap();

        (
            user.id,
            CreateTransactionEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
        )
    }

    #[tokio::test]
    async fn render_page() {
        let (user_id, state) = get_page_state();

        let response = get_create_transaction_page(State(state), Extension(user_id))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_TRANSACTION, "hx-post");
        assert_form_input(&form, "title", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "kind", "radio");
        assert_form_input(&form, "date", "date");
        assert_form_submit_button(&form);
    }
}
