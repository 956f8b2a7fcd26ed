//! Category edit page and endpoint.

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
    category::{
        Category, CategoryId,
        create::{CategoryFormData, category_form_fields, parse_category_form},
        get_category, update_category,
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for editing a category.
#[derive(Debug, Clone)]
pub struct EditCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category edit page.
pub async fn get_edit_category_page(
    State(state): State<EditCategoryEndpointState>,
    Extension(user_id): Extension<UserId>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection)?;

    Ok(edit_category_view(&category).into_response())
}

/// Handle category edit form submission.
pub async fn update_category_endpoint(
    State(state): State<EditCategoryEndpointState>,
    Extension(user_id): Extension<UserId>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let (name, kind, color) = match parse_category_form(&form) {
        Ok(fields) => fields,
        Err(error) => {
            return edit_category_form_view(category_id, &form.name, &form.color, &format!("Error: {error}"))
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

    match update_category(category_id, name, kind, color, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn edit_category_view(category: &Category) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let form = html! {
        form
            hx-put=(endpoints::format_endpoint(endpoints::PUT_CATEGORY, category.id))
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (category_form_fields(category.name.as_ref(), category.kind, category.color.as_ref()))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Category" }
        }
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Category", &[], &content)
}

fn edit_category_form_view(
    category_id: CategoryId,
    name: &str,
    color: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id))
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (category_form_fields(name, crate::transaction::TransactionKind::Expense, color))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Category" }
        }
    }
}

#[cfg(test)]
mod edit_category_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        category::{
            CategoryColor, CategoryName, create::CategoryFormData, create_category, get_category,
        },
        db::initialize,
        endpoints,
        test_utils::{assert_hx_redirect, assert_valid_html, must_get_form, parse_html_document},
        transaction::TransactionKind,
    };

    use super::{EditCategoryEndpointState, get_edit_category_page, update_category_endpoint};

    fn get_edit_state() -> (UserId, EditCategoryEndpointState) {
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
            EditCategoryEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
        )
    }

    #[tokio::test]
    async fn edit_page_shows_existing_values() {
        let (user_id, state) = get_edit_state();
        let category = create_category(
            CategoryName::new_unchecked("Groceries"),
            TransactionKind::Expense,
            CategoryColor::new_unchecked("#EF4444"),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response =
            get_edit_category_page(State(state.clone()), Extension(user_id), Path(category.id))
                .await
                .unwrap()
                .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        let form_html = form.html();
        assert!(form_html.contains("Groceries"));
        assert!(form_html.contains("#EF4444"));
    }

    #[tokio::test]
    async fn update_category_endpoint_saves_changes() {
        let (user_id, state) = get_edit_state();
        let category = create_category(
            CategoryName::new_unchecked("Groceries"),
            TransactionKind::Expense,
            CategoryColor::new_unchecked("#EF4444"),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let form = CategoryFormData {
            name: "Eating Out".to_string(),
            kind: "expense".to_string(),
            color: "#F59E0B".to_string(),
        };
        let response = update_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(category.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);

        let updated = get_category(category.id, user_id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(updated.name, CategoryName::new_unchecked("Eating Out"));
        assert_eq!(updated.color, CategoryColor::new_unchecked("#F59E0B"));
    }
}
