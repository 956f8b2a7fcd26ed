//! The transactions page with its filter form and export links.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    auth::UserId,
    category::{Category, CategoryId, get_categories_by_user},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, link,
    },
    navigation::NavBar,
    transaction::{
        KindFilter, Transaction, TransactionKind, TransactionListParams, filter_transactions,
        get_transactions_by_user,
    },
};

/// The label shown for transactions without a category.
const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the user's transactions, reduced to the subset matching the
/// filter parameters in the query string.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
    Query(params): Query<TransactionListParams>,
) -> Result<Response, Error> {
    let (transactions, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_transactions_by_user(user_id, &connection)?,
            get_categories_by_user(user_id, &connection)?,
        )
    };

    let filter = params.to_filter();
    let visible = filter_transactions(&transactions, &filter);

    Ok(transactions_view(&visible, &categories, &params).into_response())
}

fn transactions_view(
    transactions: &[&Transaction],
    categories: &[Category],
    params: &TransactionListParams,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "Add Transaction");
    let category_names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    let query_string = params.to_query_string();
    let export_csv_url = format!("{}?{}", endpoints::EXPORT_CSV, query_string);
    let export_pdf_url = format!("{}?{}", endpoints::EXPORT_PDF, query_string);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                div class="flex justify-between items-baseline mb-4"
                {
                    h2 class="text-xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        a href=(export_csv_url) class=(LINK_STYLE) { "Export CSV" }
                        a href=(export_pdf_url) class=(LINK_STYLE) { "Export PDF" }
                        (new_transaction_link)
                    }
                }

                (filter_form_view(categories, params))

                @if transactions.is_empty() {
                    p class="py-8 text-center"
                    {
                        "No transactions found. Try widening the filters or add your first transaction."
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
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for transaction in transactions {
                                    (transaction_row(transaction, &category_names))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

fn filter_form_view(categories: &[Category], params: &TransactionListParams) -> Markup {
    let search = params.search.as_deref().unwrap_or_default();
    let kind = params.kind.as_deref().unwrap_or(KindFilter::All.as_str());
    let selected_category = params.category_id();
    let from = params.from.as_deref().unwrap_or_default();
    let to = params.to.as_deref().unwrap_or_default();

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="bg-gray-50 dark:bg-gray-800 p-4 rounded-lg mb-4
                grid grid-cols-1 md:grid-cols-3 lg:grid-cols-6 gap-3 items-end"
        {
            div class="lg:col-span-2"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }

                input
                    id="search"
                    type="search"
                    name="search"
                    placeholder="Search transactions..."
                    value=(search)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for filter in [KindFilter::All, KindFilter::Income, KindFilter::Expense] {
                        option value=(filter.as_str()) selected[kind == filter.as_str()]
                        {
                            (filter.as_str())
                        }
                    }
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_category.is_none()] { "All categories" }

                    @for category in categories {
                        option
                            value=(category.id)
                            selected[selected_category == Some(category.id)]
                        {
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }

                input id="from" type="date" name="from" value=(from) class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }

                input id="to" type="date" name="to" value=(to) class=(FORM_TEXT_INPUT_STYLE);
            }

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "Apply Filters"
            }
        }
    }
}

fn transaction_row(
    transaction: &Transaction,
    category_names: &HashMap<CategoryId, &str>,
) -> Markup {
    let category_label = match transaction.category_id {
        Some(category_id) => category_names.get(&category_id).copied().unwrap_or("Unknown"),
        None => UNCATEGORIZED_LABEL,
    };

    let (amount_style, amount_sign) = match transaction.kind {
        TransactionKind::Income => ("text-green-600 dark:text-green-400 font-medium", "+"),
        TransactionKind::Expense => ("text-red-600 dark:text-red-400 font-medium", "-"),
    };

    let edit_url = endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }

            td class=(TABLE_CELL_STYLE)
            {
                span class="font-medium text-gray-900 dark:text-white" { (transaction.title) }

                @if let Some(description) = &transaction.description {
                    br;
                    span class="text-xs text-gray-500 dark:text-gray-400" { (description) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (category_label) }
            }

            td class=(TABLE_CELL_STYLE) { (transaction.kind) }

            td class=(format!("{TABLE_CELL_STYLE} {amount_style}"))
            {
                (amount_sign) (format_currency(transaction.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                " "
                button
                    hx-delete=(delete_url)
                    hx-confirm="Delete this transaction?"
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
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        category::{CategoryColor, CategoryName, create_category},
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{Transaction, TransactionKind, TransactionListParams, create_transaction},
    };

    use super::{TransactionsPageState, get_transactions_page};

    fn get_page_state() -> (UserId, TransactionsPageState) {
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
            TransactionsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
        )
    }

    #[tokio::test]
    async fn lists_transactions_with_category_labels() {
        let (user_id, state) = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryName::new_unchecked("Groceries"),
                TransactionKind::Expense,
                CategoryColor::new_unchecked("#EF4444"),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build("Lunch", 12.5, TransactionKind::Expense, date!(2025 - 06 - 01))
                    .category_id(Some(category.id)),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build("Salary", 2000.0, TransactionKind::Income, date!(2025 - 06 - 15)),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionListParams::default()),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 2);

        let text: String = html.root_element().text().collect();
        assert!(text.contains("Lunch"));
        assert!(text.contains("Groceries"));
        assert!(text.contains("Salary"));
        assert!(text.contains("Uncategorized"));
    }

    #[tokio::test]
    async fn applies_filter_parameters() {
        let (user_id, state) = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build("Lunch", 12.5, TransactionKind::Expense, date!(2025 - 06 - 01)),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build("Salary", 2000.0, TransactionKind::Income, date!(2025 - 06 - 15)),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let params = TransactionListParams {
            kind: Some("income".to_string()),
            ..Default::default()
        };
        let response = get_transactions_page(State(state), Extension(user_id), Query(params))
            .await
            .unwrap()
            .into_response();

        let html = parse_html_document(response).await;
        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 1);

        let text: String = html.root_element().text().collect();
        assert!(text.contains("Salary"));
        assert!(!text.contains("Lunch"));
    }

    #[tokio::test]
    async fn export_links_carry_current_filter() {
        let (user_id, state) = get_page_state();

        let params = TransactionListParams {
            kind: Some("expense".to_string()),
            search: Some("rent".to_string()),
            ..Default::default()
        };
        let response = get_transactions_page(State(state), Extension(user_id), Query(params))
            .await
            .unwrap()
            .into_response();

        let html = parse_html_document(response).await;
        let link_selector = Selector::parse("a").unwrap();
        let csv_link = html
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| href.starts_with(crate::endpoints::EXPORT_CSV))
            .expect("expected a CSV export link");

        assert!(csv_link.contains("kind=expense"));
        assert!(csv_link.contains("search=rent"));
    }
}
