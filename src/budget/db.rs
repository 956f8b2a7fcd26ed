//! Database operations for budgets.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserId,
    budget::{Budget, BudgetBuilder, BudgetId},
    category::ensure_category_owned,
};

/// Create a new budget in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveBudgetAmount] if the ceiling is zero or negative,
/// - [Error::MissingBudgetMonth] if the period is monthly and no month is set,
/// - [Error::InvalidBudgetMonth] if the month is outside 1-12,
/// - [Error::InvalidCategory] if the category ID does not refer to one of
///   the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    builder: BudgetBuilder,
    user_id: UserId,
    connection: &Connection,
) -> Result<Budget, Error> {
    builder.validate()?;
    ensure_category_owned(builder.category_id, user_id, connection)?;

    let budget = connection
        .prepare(
            "INSERT INTO budget (user_id, category_id, amount, period, month, year)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, category_id, amount, period, month, year",
        )?
        .query_one(
            (
                user_id.as_i64(),
                builder.category_id,
                builder.amount,
                builder.period,
                builder.month,
                builder.year,
            ),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Retrieve one of `user_id`'s budgets from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's budgets,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_budget(id: BudgetId, user_id: UserId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, period, month, year FROM budget
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of `user_id`'s budgets, most recently created first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budgets_by_user(user_id: UserId, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, period, month, year FROM budget
             WHERE user_id = :user_id ORDER BY id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the mutable fields of one of `user_id`'s budgets.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveBudgetAmount], [Error::MissingBudgetMonth], or
///   [Error::InvalidBudgetMonth] if the builder fails validation,
/// - [Error::InvalidCategory] if the category ID does not refer to one of
///   the user's categories,
/// - [Error::UpdateMissingBudget] if `id` does not refer to one of the
///   user's budgets,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    builder: BudgetBuilder,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    builder.validate()?;
    ensure_category_owned(builder.category_id, user_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE budget SET category_id = ?1, amount = ?2, period = ?3, month = ?4, year = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            builder.category_id,
            builder.amount,
            builder.period,
            builder.month,
            builder.year,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget(id));
    }

    Ok(())
}

/// Delete one of `user_id`'s budgets by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to one of the
///   user's budgets,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, user_id: UserId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget(id));
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER,
            amount REAL NOT NULL,
            period TEXT NOT NULL,
            month INTEGER,
            year INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user_period ON budget(user_id, year, month);",
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        period: row.get(4)?,
        month: row.get(5)?,
        year: row.get(6)?,
    })
}
