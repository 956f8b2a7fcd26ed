//! Budget creation page and endpoint.

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
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints,
    auth::UserId,
    budget::{Budget, BudgetBuilder, BudgetPeriod},
    category::{Category, get_categories_by_user},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles,
    },
    navigation::NavBar,
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The state needed for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Form data for budget creation and editing.
#[derive(Debug, Deserialize)]
pub struct BudgetFormData {
    pub amount: f64,
    pub period: String,
    /// The target month as a string; an empty string means no month.
    #[serde(default)]
    pub month: String,
    pub year: i32,
    /// The category ID as a string; an empty string means no category.
    #[serde(default)]
    pub category_id: String,
}

/// Parse the raw form fields into a [BudgetBuilder].
///
/// Returns a user-facing message when a field cannot be parsed. Invariants
/// such as the positive ceiling are checked when the builder is stored.
pub(super) fn parse_budget_form(form: &BudgetFormData) -> Result<BudgetBuilder, String> {
    let period = form.period.parse::<BudgetPeriod>()?;

    let month = if form.month.is_empty() {
        None
    } else {
        Some(
            form.month
                .parse::<u8>()
                .map_err(|_| format!("\"{}\" is not a valid month", form.month))?,
        )
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

    Ok(Budget::build(form.amount, period, form.year)
        .month(month)
        .category_id(category_id))
}

/// Render the budget creation page.
pub async fn get_new_budget_page(
    State(state): State<CreateBudgetEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories_by_user(user_id, &connection)?;

    Ok(new_budget_view(&categories).into_response())
}

/// Handle budget creation form submission.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<BudgetFormData>,
) -> Response {
    let builder = match parse_budget_form(&form) {
        Ok(builder) => builder,
        Err(message) => {
            return new_budget_form_view(&[], &format!("Error: {message}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match crate::budget::create_budget(builder, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::NonPositiveBudgetAmount(_)
            | Error::MissingBudgetMonth
            | Error::InvalidBudgetMonth(_)
            | Error::InvalidCategory(_)),
        ) => new_budget_form_view(&[], &format!("Error: {error}")).into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");

            error.into_alert_response()
        }
    }
}

/// Shared form fields for the create and edit pages.
pub(super) fn budget_form_fields(builder: Option<&BudgetBuilder>, categories: &[Category]) -> Markup {
    let amount = builder.map(|b| format!("{:.2}", b.amount));
    let period = builder.map(|b| b.period).unwrap_or(BudgetPeriod::Monthly);
    let month = builder.and_then(|b| b.month);
    let year = builder
        .map(|b| b.year)
        .unwrap_or_else(|| OffsetDateTime::now_utc().year());
    let category_id = builder.and_then(|b| b.category_id);

    html! {
        div
        {
            label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

            select
                id="category_id"
                name="category_id"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[category_id.is_none()] { "No category" }

                @for category in categories {
                    option
                        value=(category.id)
                        selected[category_id == Some(category.id)]
                    {
                        (category.name)
                    }
                }
            }

            p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
            {
                "Alerts are only raised for budgets tied to a category."
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Ceiling" }

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

        div
        {
            label for="period" class=(FORM_LABEL_STYLE) { "Period" }

            select id="period" name="period" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for value in [BudgetPeriod::Monthly, BudgetPeriod::Yearly] {
                    option value=(value.as_str()) selected[period == value] { (value.as_str()) }
                }
            }
        }

        div
        {
            label for="month" class=(FORM_LABEL_STYLE) { "Month (for monthly budgets)" }

            select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[month.is_none()] { "None" }

                @for (index, name) in MONTH_NAMES.iter().enumerate() {
                    @let number = (index + 1) as u8;
                    option value=(number) selected[month == Some(number)] { (name) }
                }
            }
        }

        div
        {
            label for="year" class=(FORM_LABEL_STYLE) { "Year" }

            input
                id="year"
                type="number"
                name="year"
                required
                value=(year)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn new_budget_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let form = new_budget_form_view(categories, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Budget", &[dollar_input_styles()], &content)
}

fn new_budget_form_view(categories: &[Category], error_message: &str) -> Markup {
    let create_budget_endpoint = endpoints::POST_BUDGET;

    html! {
        form
            hx-post=(create_budget_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (budget_form_fields(None, categories))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Budget" }
        }
    }
}

#[cfg(test)]
mod new_budget_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_submit_button, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::{CreateBudgetEndpointState, get_new_budget_page};

    fn get_page_state() -> (UserId, CreateBudgetEndpointState) {
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
            CreateBudgetEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
        )
    }

    #[tokio::test]
    async fn render_page() {
        let (user_id, state) = get_page_state();

        let response = get_new_budget_page(State(state), Extension(user_id))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_BUDGET, "hx-post");
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod create_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        budget::{BudgetPeriod, get_budgets_by_user},
        category::{CategoryColor, CategoryName, create_category},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment,
        },
        transaction::TransactionKind,
    };

    use super::{BudgetFormData, CreateBudgetEndpointState, create_budget_endpoint};

    fn get_endpoint_state() -> (UserId, CreateBudgetEndpointState) {
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
            CreateBudgetEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
        )
    }

    #[tokio::test]
    async fn can_create_budget() {
        let (user_id, state) = get_endpoint_state();
        let category = create_category(
            CategoryName::new_unchecked("Food"),
            TransactionKind::Expense,
            CategoryColor::new_unchecked("#EF4444"),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let form = BudgetFormData {
            amount: 500.0,
            period: "monthly".to_string(),
            month: "6".to_string(),
            year: 2025,
            category_id: category.id.to_string(),
        };
        let response = create_budget_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGETS_VIEW);

        let budgets = get_budgets_by_user(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, 500.0);
        assert_eq!(budgets[0].period, BudgetPeriod::Monthly);
        assert_eq!(budgets[0].month, Some(6));
        assert_eq!(budgets[0].category_id, Some(category.id));
    }

    #[tokio::test]
    async fn create_budget_fails_without_month() {
        let (user_id, state) = get_endpoint_state();

        let form = BudgetFormData {
            amount: 500.0,
            period: "monthly".to_string(),
            month: "".to_string(),
            year: 2025,
            category_id: "".to_string(),
        };
        let response = create_budget_endpoint(State(state), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: monthly budgets must have a target month");
    }

    #[tokio::test]
    async fn create_budget_fails_on_zero_ceiling() {
        let (user_id, state) = get_endpoint_state();

        let form = BudgetFormData {
            amount: 0.0,
            period: "monthly".to_string(),
            month: "6".to_string(),
            year: 2025,
            category_id: "".to_string(),
        };
        let response = create_budget_endpoint(State(state), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: 0 is not a valid budget ceiling, it must be greater than zero",
        );
    }
}
