//! Budgets and budget alert evaluation.

mod alerts;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use alerts::{
    ALERT_THRESHOLD_PERCENT, AlertSeverity, BudgetAlert, evaluate_budget_alerts,
};
pub use create::{create_budget_endpoint, get_new_budget_page};
pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, get_budgets_by_user,
    update_budget,
};
pub use delete::delete_budget_endpoint;
pub use domain::{Budget, BudgetBuilder, BudgetId, BudgetPeriod};
pub use edit::{get_edit_budget_page, update_budget_endpoint};
pub use list::get_budgets_page;
