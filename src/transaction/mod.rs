//! Income and expense transactions, the core records of the application.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod filter;
mod list;

pub use create::{create_transaction_endpoint, get_create_transaction_page};
pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions_by_user, update_transaction,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{Transaction, TransactionBuilder, TransactionId, TransactionKind};
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use filter::{KindFilter, TransactionFilter, TransactionListParams, filter_transactions};
pub use list::get_transactions_page;
