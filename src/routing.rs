//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budgets_page, get_edit_budget_page,
        get_new_budget_page, update_budget_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, get_new_category_page, update_category_endpoint,
    },
    dashboard::{dismiss_alert_endpoint, get_dashboard_page},
    endpoints,
    export::{export_csv_endpoint, export_pdf_endpoint},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_create_transaction_page,
        get_edit_transaction_page, get_transactions_page, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_create_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::NEW_BUDGET_VIEW, get(get_new_budget_page))
        .route(endpoints::EDIT_BUDGET_VIEW, get(get_edit_budget_page))
        .route(endpoints::EXPORT_CSV, get(export_csv_endpoint))
        .route(endpoints::EXPORT_PDF, get(export_pdf_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::POST_TRANSACTION,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::PUT_TRANSACTION,
                put(update_transaction_endpoint),
            )
            .route(
                endpoints::DELETE_TRANSACTION,
                delete(delete_transaction_endpoint),
            )
            .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
            .route(endpoints::PUT_CATEGORY, put(update_category_endpoint))
            .route(endpoints::DELETE_CATEGORY, delete(delete_category_endpoint))
            .route(endpoints::POST_BUDGET, post(create_budget_endpoint))
            .route(endpoints::PUT_BUDGET, put(update_budget_endpoint))
            .route(endpoints::DELETE_BUDGET, delete(delete_budget_endpoint))
            .route(endpoints::DISMISS_ALERT, post(dismiss_alert_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod router_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, routing::get_index_page};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "asecretsecret", "Etc/UTC").unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_page_is_reachable_without_a_session() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
    }

    #[tokio::test]
    async fn dashboard_redirects_to_log_in_without_a_session() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
        let location = response.header("location");
        assert!(
            location
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn unknown_route_renders_not_found_page() {
        let server = get_test_server();

        let response = server.get("/no/such/page").await;

        response.assert_status_not_found();
    }
}
