//! Database initialization for the application's domain models.

use rusqlite::Connection;

use crate::{
    Error, auth::create_user_table, budget::create_budget_table, category::create_category_table,
    transaction::create_transaction_table,
};

/// Create the tables for all of the application's domain models.
///
/// Tables are only created if they do not already exist, so it is safe to
/// call this function on an existing database.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // SQLite does not enforce foreign keys unless asked to.
    connection.pragma_update(None, "foreign_keys", true)?;

    create_user_table(connection)?;
    create_category_table(connection)?;
    create_transaction_table(connection)?;
    create_budget_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let mut statement = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let table_names: Vec<String> = statement
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();

        for table in ["budget", "category", "transaction", "user"] {
            assert!(
                table_names.iter().any(|name| name == table),
                "expected table {table} to exist, got {table_names:?}"
            );
        }
    }

    #[test]
    fn is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");
        initialize(&connection).expect("Initializing twice should not fail");
    }
}
