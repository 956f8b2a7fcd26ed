//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// All categories, transactions, and budgets belong to exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The email address the user registered with.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns an [Error::DuplicateEmail] if a user with `email` already exists,
/// or an [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (email, password_hash.as_ref()),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_owned(),
        password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an [Error::NotFound] if `user_id` does not
/// belong to a registered user, or an [Error::SqlError] if there was an
/// error trying to access the database.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM user WHERE id = :id")?
        .query_one(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
///
/// This function will return an [Error::NotFound] if `email` does not
/// belong to a registered user, or an [Error::SqlError] if there was an
/// error trying to access the database.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM user WHERE email = :email")?
        .query_one(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let email = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserId::new(raw_id),
        email,
        password_hash: PasswordHash::new_unchecked(raw_password_hash),
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{Error, auth::PasswordHash};

    use super::{create_user, create_user_table, get_user_by_email, get_user_by_id};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).expect("Could not create user table");
        connection
    }

    #[test]
    fn create_user_succeeds() {
        let connection = get_test_connection();

        let user = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2".to_string()),
            &connection,
        )
        .expect("Could not create user");

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.email, "test@test.com");
    }

    #[test]
    fn create_user_fails_on_duplicate_email() {
        let connection = get_test_connection();
        create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2".to_string()),
            &connection,
        )
        .expect("Could not create user");

        let duplicate = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter3".to_string()),
            &connection,
        );

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_id_succeeds() {
        let connection = get_test_connection();
        let inserted = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2".to_string()),
            &connection,
        )
        .unwrap();

        let selected = get_user_by_id(inserted.id, &connection);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let connection = get_test_connection();
        let inserted = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2".to_string()),
            &connection,
        )
        .unwrap();

        let selected = get_user_by_email("test@test.com", &connection);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_user_by_email_fails_on_unknown_email() {
        let connection = get_test_connection();

        let selected = get_user_by_email("nobody@test.com", &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }
}
