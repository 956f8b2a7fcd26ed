//! Budgets list page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Month;

use crate::{
    AppState, Error, endpoints,
    auth::UserId,
    budget::{Budget, BudgetPeriod, get_budgets_by_user},
    category::{CategoryId, get_categories_by_user},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the user's budgets.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_by_user(user_id, &connection)?;
    let category_names: HashMap<CategoryId, String> = get_categories_by_user(user_id, &connection)?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    Ok(budgets_view(&budgets, &category_names).into_response())
}

fn budgets_view(budgets: &[Budget], category_names: &HashMap<CategoryId, String>) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let new_budget_link = link(endpoints::NEW_BUDGET_VIEW, "Create Budget");

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md"
            {
                div class="flex justify-between items-baseline mb-4"
                {
                    h2 class="text-xl font-bold" { "Budgets" }
                    (new_budget_link)
                }

                @if budgets.is_empty() {
                    p
                    {
                        "Nothing here yet. Set a monthly ceiling for a category and you will be
                        warned when spending approaches it."
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
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Ceiling" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Target" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for budget in budgets {
                                    (budget_row(budget, category_names))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Budgets", &[], &content)
}

fn budget_row(budget: &Budget, category_names: &HashMap<CategoryId, String>) -> Markup {
    let category_label = match budget.category_id {
        Some(category_id) => category_names
            .get(&category_id)
            .map(|name| name.as_str())
            .unwrap_or("Unknown"),
        None => "No category",
    };

    let target = match (budget.period, budget.month) {
        (BudgetPeriod::Monthly, Some(month)) => match Month::try_from(month) {
            Ok(month) => format!("{month} {}", budget.year),
            Err(_) => format!("{month}/{}", budget.year),
        },
        _ => budget.year.to_string(),
    };

    let edit_url = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_BUDGET, budget.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (category_label) }
            }

            td class=(TABLE_CELL_STYLE) { (format_currency(budget.amount)) }

            td class=(TABLE_CELL_STYLE) { (budget.period) }

            td class=(TABLE_CELL_STYLE) { (target) }

            td class=(TABLE_CELL_STYLE)
            {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                " "
                button
                    hx-delete=(delete_url)
                    hx-confirm="Delete this budget?"
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
mod budgets_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        budget::{Budget, BudgetPeriod, create_budget},
        category::{CategoryColor, CategoryName, create_category},
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::TransactionKind,
    };

    use super::{BudgetsPageState, get_budgets_page};

    fn get_page_state() -> (UserId, BudgetsPageState) {
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
            BudgetsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
        )
    }

    #[tokio::test]
    async fn lists_budgets_with_category_names() {
        let (user_id, state) = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryName::new_unchecked("Food"),
                TransactionKind::Expense,
                CategoryColor::new_unchecked("#EF4444"),
                user_id,
                &connection,
            )
            .unwrap();
            create_budget(
                Budget::build(500.0, BudgetPeriod::Monthly, 2025)
                    .month(Some(6))
                    .category_id(Some(category.id)),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let response = get_budgets_page(State(state), Extension(user_id))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 1);

        let text: String = html.root_element().text().collect();
        assert!(text.contains("Food"));
        assert!(text.contains("$500.00"));
        assert!(text.contains("June 2025"));
    }

    #[tokio::test]
    async fn shows_empty_state_without_budgets() {
        let (user_id, state) = get_page_state();

        let response = get_budgets_page(State(state), Extension(user_id))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Nothing here yet"));
    }
}
