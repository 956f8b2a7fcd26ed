//! Budget edit page and endpoint.

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
    budget::{
        Budget, BudgetBuilder, BudgetId,
        create::{BudgetFormData, budget_form_fields, parse_budget_form},
        get_budget, update_budget,
    },
    category::{Category, get_categories_by_user},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for editing a budget.
#[derive(Debug, Clone)]
pub struct EditBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget edit page.
pub async fn get_edit_budget_page(
    State(state): State<EditBudgetEndpointState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(budget_id, user_id, &connection)?;
    let categories = get_categories_by_user(user_id, &connection)?;

    Ok(edit_budget_view(&budget, &categories).into_response())
}

/// Handle budget edit form submission.
pub async fn update_budget_endpoint(
    State(state): State<EditBudgetEndpointState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
    Form(form): Form<BudgetFormData>,
) -> Response {
    let builder = match parse_budget_form(&form) {
        Ok(builder) => builder,
        Err(message) => {
            return edit_budget_form_view(budget_id, None, &[], &format!("Error: {message}"))
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

    match update_budget(budget_id, builder.clone(), user_id, &connection) {
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
        ) => edit_budget_form_view(budget_id, Some(&builder), &[], &format!("Error: {error}"))
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a budget: {error}");

            error.into_alert_response()
        }
    }
}

fn edit_budget_view(budget: &Budget, categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let builder = BudgetBuilder {
        amount: budget.amount,
        period: budget.period,
        year: budget.year,
        month: budget.month,
        category_id: budget.category_id,
    };
    let form = edit_budget_form_view(budget.id, Some(&builder), categories, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Budget", &[dollar_input_styles()], &content)
}

fn edit_budget_form_view(
    budget_id: BudgetId,
    builder: Option<&BudgetBuilder>,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_BUDGET, budget_id);

    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (budget_form_fields(builder, categories))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Budget" }
        }
    }
}
