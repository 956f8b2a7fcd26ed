//! Category delete endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{AppState, Error, auth::UserId, category::CategoryId, endpoints};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle a request to delete a category.
///
/// Transactions and budgets referencing the category keep existing and fall
/// back to the "Uncategorized" label in views and exports.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryEndpointState>,
    Extension(user_id): Extension<UserId>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match crate::category::delete_category(category_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting a category: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        auth::{PasswordHash, UserId, create_user},
        category::{CategoryColor, CategoryName, create_category, get_categories_by_user},
        db::initialize,
        endpoints,
        test_utils::assert_hx_redirect,
        transaction::TransactionKind,
    };

    use super::{DeleteCategoryEndpointState, delete_category_endpoint};

    fn get_delete_state() -> (UserId, DeleteCategoryEndpointState) {
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
            DeleteCategoryEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
        )
    }

    #[tokio::test]
    async fn can_delete_category() {
        let (user_id, state) = get_delete_state();
        let category = create_category(
            CategoryName::new_unchecked("Groceries"),
            TransactionKind::Expense,
            CategoryColor::new_unchecked("#EF4444"),
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response =
            delete_category_endpoint(State(state.clone()), Extension(user_id), Path(category.id))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);

        let categories =
            get_categories_by_user(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(categories.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_category_returns_not_found() {
        let (user_id, state) = get_delete_state();

        let response = delete_category_endpoint(State(state), Extension(user_id), Path(12345))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
