//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserId,
    category::{Category, CategoryColor, CategoryId, CategoryName},
    transaction::TransactionKind,
};

/// Create a category and return it with its generated ID.
pub fn create_category(
    name: CategoryName,
    kind: TransactionKind,
    color: CategoryColor,
    user_id: UserId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, kind, color) VALUES (?1, ?2, ?3, ?4);",
        (user_id.as_i64(), name.as_ref(), kind, color.as_ref()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name,
        kind,
        color,
    })
}

/// Retrieve a single category owned by `user_id` by its ID.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, color FROM category
             WHERE id = :id AND user_id = :user_id;",
        )?
        .query_one(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of `user_id`'s categories ordered alphabetically by name.
pub fn get_categories_by_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, color FROM category
             WHERE user_id = :user_id ORDER BY name ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name, kind, and color. Returns an error if the
/// category doesn't exist or belongs to another user.
pub fn update_category(
    category_id: CategoryId,
    name: CategoryName,
    kind: TransactionKind,
    color: CategoryColor,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, kind = ?2, color = ?3 WHERE id = ?4 AND user_id = ?5",
        (name.as_ref(), kind, color.as_ref(), category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory(category_id));
    }

    Ok(())
}

/// Delete a category by ID. Returns an error if the category doesn't exist
/// or belongs to another user.
///
/// Transactions and budgets that reference the category keep existing with
/// their category reference set to NULL.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory(category_id));
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            color TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_name ON category(user_id, name);",
    )?;

    Ok(())
}

/// Check that `category_id`, if given, refers to a category owned by `user_id`.
///
/// A category belonging to another user produces the same error as a
/// nonexistent one, so the response does not leak whether the category exists.
pub(crate) fn ensure_category_owned(
    category_id: Option<CategoryId>,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let exists: Result<i64, rusqlite::Error> = connection
        .prepare("SELECT id FROM category WHERE id = :id AND user_id = :user_id")?
        .query_one(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            |row| row.get(0),
        );

    match exists {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::InvalidCategory(Some(category_id))),
        Err(error) => Err(error.into()),
    }
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;
    let raw_color: String = row.get(4)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        kind: row.get(3)?,
        color: CategoryColor::new_unchecked(&raw_color),
    })
}
