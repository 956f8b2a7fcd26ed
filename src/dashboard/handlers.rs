//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for displaying the dashboard and dismissing budget alerts
//! - HTML view functions for rendering the dashboard UI
//! - The session cookie that remembers dismissed alerts

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    auth::UserId,
    budget::{AlertSeverity, BudgetAlert, BudgetId, evaluate_budget_alerts, get_budgets_by_user},
    category::get_categories_by_user,
    dashboard::{
        cards::stat_cards_view,
        charts::{DashboardChart, charts_script, expenses_by_category_chart, income_expense_chart},
        stats::summarize_transactions,
    },
    html::{HeadElement, base, link},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::get_transactions_by_user,
};

/// Session cookie holding the IDs of dismissed budget alerts as a JSON array.
///
/// The cookie carries no expiry, so the browser drops it when the session
/// ends. Dismissing is monotonic: IDs are only ever added.
const DISMISSED_ALERTS_COOKIE: &str = "dismissed_alerts";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let transactions = get_transactions_by_user(user_id, &connection)?;

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let categories = get_categories_by_user(user_id, &connection)?;
    let budgets = get_budgets_by_user(user_id, &connection)?;

    let today = get_today(&state.local_timezone)?;
    let summary = summarize_transactions(&transactions, today);

    let dismissed = read_dismissed_alerts(&jar);
    let alerts = evaluate_budget_alerts(
        &budgets,
        &transactions,
        &categories,
        today.month(),
        today.year(),
        &dismissed,
    );

    let charts = [
        DashboardChart {
            id: "expenses-by-category-chart",
            options: expenses_by_category_chart(&transactions, &categories).to_string(),
        },
        DashboardChart {
            id: "income-expense-chart",
            options: income_expense_chart(&transactions, today).to_string(),
        },
    ];

    Ok(dashboard_view(nav_bar, stat_cards_view(&summary), &alerts, &charts).into_response())
}

/// API endpoint to dismiss a budget alert for the rest of the session.
///
/// Adds the budget ID to the dismissal cookie and returns the refreshed
/// alerts fragment for the htmx swap.
pub async fn dismiss_alert_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
    jar: PrivateCookieJar,
) -> Response {
    let mut dismissed = read_dismissed_alerts(&jar);
    dismissed.insert(budget_id);

    let jar = write_dismissed_alerts(jar, &dismissed);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let alerts = (|| -> Result<Vec<BudgetAlert>, Error> {
        let transactions = get_transactions_by_user(user_id, &connection)?;
        let categories = get_categories_by_user(user_id, &connection)?;
        let budgets = get_budgets_by_user(user_id, &connection)?;
        let today = get_today(&state.local_timezone)?;

        Ok(evaluate_budget_alerts(
            &budgets,
            &transactions,
            &categories,
            today.month(),
            today.year(),
            &dismissed,
        ))
    })();

    match alerts {
        Ok(alerts) => (jar, budget_alerts_view(&alerts)).into_response(),
        Err(error) => {
            tracing::error!("Could not re-evaluate budget alerts: {error}");
            error.into_alert_response()
        }
    }
}

fn get_today(local_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", local_timezone);
        Error::InvalidTimezoneError(local_timezone.to_owned())
    })?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

fn read_dismissed_alerts(jar: &PrivateCookieJar) -> HashSet<BudgetId> {
    let Some(cookie) = jar.get(DISMISSED_ALERTS_COOKIE) else {
        return HashSet::new();
    };

    match serde_json::from_str(cookie.value()) {
        Ok(ids) => ids,
        Err(error) => {
            tracing::warn!("Could not parse dismissed alerts cookie: {error}");
            HashSet::new()
        }
    }
}

fn write_dismissed_alerts(jar: PrivateCookieJar, dismissed: &HashSet<BudgetId>) -> PrivateCookieJar {
    let value = match serde_json::to_string(dismissed) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!("Could not serialize dismissed alerts: {error}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((DISMISSED_ALERTS_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Renders the dashboard page when no transaction data exists.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding your first transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Statistics and charts will show up here once you add some transactions.
                Start by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with stat cards, alerts, and charts.
fn dashboard_view(
    nav_bar: NavBar,
    stat_cards: Markup,
    alerts: &[BudgetAlert],
    charts: &[DashboardChart],
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (stat_cards)

            (budget_alerts_view(alerts))

            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in charts {
                        div
                            id=(chart.id)
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

/// Renders the list of active budget alerts.
///
/// The fragment is also returned by the dismissal endpoint, which swaps it
/// in place via htmx.
fn budget_alerts_view(alerts: &[BudgetAlert]) -> Markup {
    html! {
        div id="budget-alerts" class="w-full space-y-3 mb-4"
        {
            @for alert in alerts {
                (budget_alert_view(alert))
            }
        }
    }
}

fn budget_alert_view(alert: &BudgetAlert) -> Markup {
    let (container_style, heading_style, heading) = match alert.severity() {
        AlertSeverity::Exceeded => (
            "rounded-lg p-4 bg-red-50 dark:bg-red-900/30 border border-red-200 dark:border-red-800",
            "font-semibold text-red-800 dark:text-red-200",
            "Budget Exceeded!",
        ),
        AlertSeverity::Warning => (
            "rounded-lg p-4 bg-yellow-50 dark:bg-yellow-900/30 border border-yellow-200 dark:border-yellow-800",
            "font-semibold text-yellow-800 dark:text-yellow-200",
            "Budget Warning",
        ),
    };

    let dismiss_url = endpoints::format_endpoint(endpoints::DISMISS_ALERT, alert.budget_id);

    html! {
        div class=(container_style) role="alert"
        {
            div class="flex items-start gap-3"
            {
                div class="flex-1 min-w-0"
                {
                    h4 class=(heading_style) { (heading) }

                    p class="text-sm mt-1"
                    {
                        "You've spent "
                        strong { (format!("${:.2}", alert.spent)) }
                        " of your "
                        strong { (format!("${:.2}", alert.budget)) }
                        " budget for "
                        strong { (alert.category_name) }
                        " (" (format!("{:.0}", alert.percentage)) "%)"
                    }
                }

                button
                    hx-post=(dismiss_url)
                    hx-target="#budget-alerts"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    aria-label="Dismiss alert"
                    class="flex-shrink-0 font-bold bg-transparent border-none cursor-pointer"
                {
                    "✕"
                }
            }
        }
    }
}
