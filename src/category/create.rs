//! Category creation page and endpoint.

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
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    auth::UserId,
    category::{CategoryColor, CategoryName, create_category},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    transaction::TransactionKind,
};

/// The color offered by the form before the user picks one.
const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Form data for category creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub kind: String,
    pub color: String,
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    new_category_view().into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(new_category): Form<CategoryFormData>,
) -> Response {
    let (name, kind, color) = match parse_category_form(&new_category) {
        Ok(fields) => fields,
        Err(error) => {
            return new_category_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(name, kind, color, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

/// Parse and validate the raw form fields.
///
/// Returns a user-facing message when a field is invalid.
pub(super) fn parse_category_form(
    form: &CategoryFormData,
) -> Result<(CategoryName, TransactionKind, CategoryColor), String> {
    let name = CategoryName::new(&form.name).map_err(|error| error.to_string())?;
    let kind = form.kind.parse::<TransactionKind>()?;
    let color = CategoryColor::new(&form.color).map_err(|error| error.to_string())?;

    Ok((name, kind, color))
}

/// Shared form fields for the create and edit pages.
pub(super) fn category_form_fields(
    name: &str,
    kind: TransactionKind,
    color: &str,
) -> Markup {
    html! {
        div
        {
            label
                for="name"
                class=(FORM_LABEL_STYLE)
            {
                "Category Name"
            }

            input
                id="name"
                type="text"
                name="name"
                placeholder="Category Name"
                required
                autofocus
                value=(name)
                class=(FORM_TEXT_INPUT_STYLE);
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
            label
                for="color"
                class=(FORM_LABEL_STYLE)
            {
                "Color"
            }

            input
                id="color"
                type="color"
                name="color"
                value=(color)
                class="h-10 w-full cursor-pointer rounded border border-gray-300 dark:border-gray-600";
        }
    }
}

fn new_category_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Category", &[], &content)
}

fn new_category_form_view(error_message: &str) -> Markup {
    let create_category_endpoint = endpoints::POST_CATEGORY;

    html! {
        form
            hx-post=(create_category_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (category_form_fields("", TransactionKind::Expense, DEFAULT_CATEGORY_COLOR))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}
