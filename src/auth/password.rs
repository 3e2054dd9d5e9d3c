//! Password strength checks and hashing.
//!
//! `ValidatedPassword` wraps a string that zxcvbn rates as hard to guess, and
//! `PasswordHash` is the salted bcrypt hash stored for a user.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that has been validated, but not yet hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create and validate a new password from a string.
    ///
    /// `user_inputs` are words the password should not be built from, such as the
    /// user's email address. Email addresses also contribute their local part and
    /// its pieces, since zxcvbn only matches user inputs as whole words.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with zxcvbn's suggestions if the password is
    /// rated below [Score::Three].
    pub fn new(raw_password_string: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let password_analysis = zxcvbn(raw_password_string, &user_input_words(user_inputs));

        match password_analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password_string.to_string())),
            _ => Err(Error::TooWeak(
                password_analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// Create a new `ValidatedPassword` without any validation.
    ///
    /// The caller should ensure that `raw_password_string` is a valid and secure password.
    pub fn new_unchecked(raw_password_string: &str) -> Self {
        Self(raw_password_string.to_string())
    }
}

/// `user_inputs` plus, for email addresses, the local part and its pieces split
/// on punctuation, e.g. `jane.doe@example.com` adds `jane.doe`, `jane` and `doe`.
fn user_input_words<'a>(user_inputs: &[&'a str]) -> Vec<&'a str> {
    let mut words = Vec::with_capacity(user_inputs.len());

    for &input in user_inputs {
        words.push(input);

        if let Some((local_part, _)) = input.split_once('@') {
            words.push(local_part);
            words.extend(
                local_part
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|piece| !piece.is_empty() && *piece != local_part),
            );
        }
    }

    words
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default bcrypt cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with the given bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the password could not be hashed.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash read from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod validated_password_tests {
    use crate::{Error, auth::ValidatedPassword};

    use super::user_input_words;

    #[test]
    fn new_fails_on_empty() {
        let result = ValidatedPassword::new("", &[]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn new_fails_on_short_password() {
        let result = ValidatedPassword::new("imtooshort", &[]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn new_fails_on_password_made_from_email() {
        let result = ValidatedPassword::new("janedoe2000", &["janedoe2000@example.com"]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn new_fails_on_password_made_from_dotted_email() {
        let result = ValidatedPassword::new("jane.doe.1990", &["jane.doe.1990@example.com"]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn email_contributes_local_part_and_pieces() {
        assert_eq!(
            user_input_words(&["jane.doe_2000@example.com", "plain"]),
            vec![
                "jane.doe_2000@example.com",
                "jane.doe_2000",
                "jane",
                "doe",
                "2000",
                "plain",
            ]
        );
    }

    #[test]
    fn new_succeeds_on_long_password() {
        let result = ValidatedPassword::new("asomewhatlongpassword1", &[]);

        assert!(result.is_ok());
    }
}
