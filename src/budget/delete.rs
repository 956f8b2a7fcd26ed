//! Budget delete endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{AppState, Error, auth::UserId, budget::BudgetId, endpoints};

/// The state needed for deleting a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle a request to delete a budget.
pub async fn delete_budget_endpoint(
    State(state): State<DeleteBudgetEndpointState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match crate::budget::delete_budget(budget_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting a budget: {error}");

            error.into_alert_response()
        }
    }
}
