//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserId, transaction::TransactionKind};

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hex color code such as "#3B82F6", used to color a category in lists and
/// charts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// Create a category color from a hex color code.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidColor] if `color` is not a
    /// '#' followed by six hex digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let digits = match color.strip_prefix('#') {
            Some(digits) => digits,
            None => return Err(Error::InvalidColor(color.to_string())),
        };

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(color.to_string()));
        }

        Ok(Self(color.to_uppercase()))
    }

    /// Create a category color without validation.
    ///
    /// The caller should ensure that the string is a valid hex color code.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_string())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for expenses and income, e.g., 'Groceries', 'Eating Out', 'Wages'.
///
/// A category has a kind, but the application does not require that a
/// transaction's kind match its category's kind: the two are independently
/// mutable and checking is deliberately left to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The ID of the user that owns this category.
    pub user_id: UserId,
    /// The display name of the category.
    pub name: CategoryName,
    /// Whether the category is for income or expenses.
    pub kind: TransactionKind,
    /// The display color of the category.
    pub color: CategoryColor,
}


#[cfg(test)]
mod category_color_tests {
    use crate::Error;

    use super::CategoryColor;

    #[test]
    fn new_accepts_hex_color_codes() {
        assert_eq!(
            CategoryColor::new("#3b82f6"),
            Ok(CategoryColor::new_unchecked("#3B82F6"))
        );
    }

    #[test]
    fn new_rejects_missing_hash() {
        assert_eq!(
            CategoryColor::new("3B82F6"),
            Err(Error::InvalidColor("3B82F6".to_string()))
        );
    }

    #[test]
    fn new_rejects_wrong_length() {
        assert_eq!(
            CategoryColor::new("#FFF"),
            Err(Error::InvalidColor("#FFF".to_string()))
        );
    }

    #[test]
    fn new_rejects_non_hex_digits() {
        assert_eq!(
            CategoryColor::new("#GGGGGG"),
            Err(Error::InvalidColor("#GGGGGG".to_string()))
        );
    }
}
