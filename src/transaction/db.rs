//! Database operations for transactions.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserId,
    category::ensure_category_owned,
    transaction::{Transaction, TransactionBuilder, TransactionId},
};

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyTransactionTitle] if the title is empty or whitespace,
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::InvalidCategory] if the category ID does not refer to one of
///   the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;
    ensure_category_owned(builder.category_id, user_id, connection)?;

    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, category_id, title, description, amount, kind, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, user_id, category_id, title, description, amount, kind, date,
                created_at, updated_at",
        )?
        .query_one(
            (
                user_id.as_i64(),
                builder.category_id,
                builder.title.trim(),
                &builder.description,
                builder.amount,
                builder.kind,
                builder.date,
                now,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve one of `user_id`'s transactions from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, category_id, title, description, amount, kind, date,
                created_at, updated_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all of `user_id`'s transactions, most recent first.
///
/// An empty vector is returned if the user has no transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, title, description, amount, kind, date,
                created_at, updated_at
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the mutable fields of one of `user_id`'s transactions.
///
/// The `updated_at` column is set to the current time.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyTransactionTitle] if the title is empty or whitespace,
/// - [Error::NegativeAmount] if the amount is negative,
/// - [Error::InvalidCategory] if the category ID does not refer to one of
///   the user's categories,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to one of the
///   user's transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    builder.validate()?;
    ensure_category_owned(builder.category_id, user_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET category_id = ?1, title = ?2, description = ?3, amount = ?4, kind = ?5, date = ?6,
            updated_at = ?7
         WHERE id = ?8 AND user_id = ?9",
        (
            builder.category_id,
            builder.title.trim(),
            &builder.description,
            builder.amount,
            builder.kind,
            builder.date,
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction(id));
    }

    Ok(())
}

/// Delete one of `user_id`'s transactions by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to one of the
///   user's transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction(id));
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER,
                title TEXT NOT NULL,
                description TEXT,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
            );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        category_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        amount: row.get(5)?,
        kind: row.get(6)?,
        date: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
