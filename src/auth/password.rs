//! Password validation and hashing.

use serde::{Deserialize, Serialize};
use zxcvbn::{Score, zxcvbn};

use crate::Error;

/// The minimum length of a password.
pub const MINIMUM_PASSWORD_LENGTH: u8 = 8;

/// A password that has been checked against common password guessing attacks.
///
/// Use [ValidatedPassword::new] to validate a raw password string, then
/// [PasswordHash::new] to hash it for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Validate a raw password string.
    ///
    /// # Errors
    ///
    /// Returns an [Error::TooWeak] if the password is shorter than
    /// [MINIMUM_PASSWORD_LENGTH] or too easy to guess.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        if raw_password.len() < MINIMUM_PASSWORD_LENGTH as usize {
            return Err(Error::TooWeak(format!(
                "passwords must be at least {MINIMUM_PASSWORD_LENGTH} characters long"
            )));
        }

        let entropy = zxcvbn(raw_password, &[]);

        if entropy.score() < Score::Three {
            let message = entropy
                .feedback()
                .and_then(|feedback| feedback.warning())
                .map(|warning| warning.to_string())
                .unwrap_or_else(|| "try a longer password with more unusual words".to_string());

            return Err(Error::TooWeak(message));
        }

        Ok(Self(raw_password.to_string()))
    }

    /// Create a validated password without checking its strength.
    ///
    /// The caller should ensure that the password has been validated elsewhere.
    #[cfg(test)]
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_string())
    }
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a validated password for storage.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the underlying hashing library fails.
    pub fn new(password: ValidatedPassword) -> Result<Self, Error> {
        let hash = bcrypt::hash(&password.0, bcrypt::DEFAULT_COST)
            .map_err(|error| Error::HashingError(error.to_string()))?;

        Ok(Self(hash))
    }

    /// Wrap an existing hash string, e.g. one loaded from the database.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the string is
    /// not a valid bcrypt hash it will cause verification to fail but not affect memory safety.
    pub fn new_unchecked(hash: String) -> Self {
        Self(hash)
    }

    /// Check `raw_password` against this hash.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidCredentials] if the password does not match,
    /// or an [Error::HashingError] if the underlying hashing library fails.
    pub fn verify(&self, raw_password: &str) -> Result<(), Error> {
        let matches = bcrypt::verify(raw_password, &self.0)
            .map_err(|error| Error::HashingError(error.to_string()))?;

        if matches {
            Ok(())
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
