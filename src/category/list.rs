//! Categories list page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    auth::UserId,
    category::{Category, get_categories_by_user},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, link,
    },
    navigation::NavBar,
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the user's categories.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories_by_user(user_id, &connection)?;

    Ok(categories_view(&categories).into_response())
}

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let new_category_link = link(endpoints::NEW_CATEGORY_VIEW, "Create Category");

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md"
            {
                div class="flex justify-between items-baseline mb-4"
                {
                    h2 class="text-xl font-bold" { "Categories" }
                    (new_category_link)
                }

                @if categories.is_empty() {
                    p
                    {
                        "Nothing here yet. Categories let you group transactions and set budgets."
                    }
                } @else {
                    div class="relative overflow-x-auto shadow-md rounded"
                    {
                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Color" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for category in categories {
                                    (category_row(category))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Categories", &[], &content)
}

fn category_row(category: &Category) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (category.name) }
            }

            td class=(TABLE_CELL_STYLE) { (category.kind) }

            td class=(TABLE_CELL_STYLE)
            {
                span
                    class="inline-block w-6 h-6 rounded-full border border-gray-300 dark:border-gray-600"
                    style=(format!("background-color: {}", category.color))
                    title=(category.color)
                {}
            }

            td class=(TABLE_CELL_STYLE)
            {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                " "
                button
                    hx-delete=(delete_url)
                    hx-confirm="Delete this category? Its transactions and budgets will become uncategorized."
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

#[cfg(test)]
mod categories_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        category::{CategoryColor, CategoryName, create_category},
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::TransactionKind,
    };

    use super::{CategoriesPageState, get_categories_page};

    fn get_page_state() -> (UserId, CategoriesPageState) {
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
            CategoriesPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
        )
    }

    #[tokio::test]
    async fn lists_categories() {
        let (user_id, state) = get_page_state();
        create_category(
            CategoryName::new_unchecked("Groceries"),
            TransactionKind::Expense,
            CategoryColor::new_unchecked("#EF4444"),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        create_category(
            CategoryName::new_unchecked("Salary"),
            TransactionKind::Income,
            CategoryColor::new_unchecked("#22C55E"),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_categories_page(State(state), Extension(user_id))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 2);

        let text: String = html.root_element().text().collect();
        assert!(text.contains("Groceries"));
        assert!(text.contains("Salary"));
    }

    #[tokio::test]
    async fn shows_empty_state_without_categories() {
        let (user_id, state) = get_page_state();

        let response = get_categories_page(State(state), Extension(user_id))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Nothing here yet"));
    }
}
