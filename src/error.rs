//! Defines the app level error type and conversions to rendered HTML pages and alerts.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    advice::AdviceError, alert::Alert, internal_server_error::InternalServerError,
    not_found::NotFoundError, transaction::FieldErrors,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password do not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// A write was attempted without a logged in user.
    #[error("you must be logged in")]
    NotAuthenticated,

    /// There was an error creating or formatting a cookie expiry date-time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry date-time \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not an email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// Another user has already registered with the email address.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The transaction form has one or more invalid fields.
    #[error("the transaction form has invalid fields")]
    InvalidForm(FieldErrors),

    /// A [crate::transaction::TransactionEditor] operation was called in a state where it does not apply.
    #[error("the transaction editor cannot do that right now")]
    InvalidEditorState,

    /// The store did not answer within the submit timeout.
    ///
    /// The write may still have been applied.
    #[error("the database did not respond within {0:?}")]
    StoreTimeout(Duration),

    /// The blocking task running a store call panicked or was cancelled.
    #[error("the database task failed: {0}")]
    StoreTaskFailed(String),

    /// The budget goal form has an invalid value.
    #[error("{0}")]
    InvalidBudgetGoal(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a budget goal that does not exist
    #[error("tried to delete a budget goal that is not in the database")]
    DeleteMissingBudgetGoal,

    /// A call to the generative flow server failed.
    #[error(transparent)]
    Advice(#[from] AdviceError),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                Alert::ErrorSimple {
                    message: "You must be logged in.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::InvalidForm(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid transaction".to_owned(),
                    details: "Fix the highlighted fields and try again.".to_owned(),
                },
            ),
            Error::InvalidBudgetGoal(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid budget goal".to_owned(),
                    details,
                },
            ),
            Error::StoreTimeout(timeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                Alert::Error {
                    message: "Failed to save transaction.".to_owned(),
                    details: format!(
                        "The database did not respond within {} seconds. \
                        Refresh the page to check whether the change was saved before trying again.",
                        timeout.as_secs()
                    ),
                },
            ),
            error @ (Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::StoreTaskFailed(_)) => {
                tracing::error!("Could not write to the database: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Failed to save transaction.".to_owned(),
                        details: error.to_string(),
                    },
                )
            }
            Error::NotFound | Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingBudgetGoal => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete budget goal".to_owned(),
                    details: "The budget goal could not be found. \
                    Try refreshing the page to see if the goal has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DuplicateEmail => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Email already in use".to_owned(),
                    details: "Another account uses that email address.".to_owned(),
                },
            ),
            Error::InvalidEmail(email) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Invalid email".to_owned(),
                    details: format!("\"{email}\" is not a valid email address."),
                },
            ),
            Error::Advice(error) => {
                tracing::warn!("Generative flow call failed: {error}");
                (
                    error.status_code(),
                    Alert::Error {
                        message: "Could not get a response from the AI assistant".to_owned(),
                        details: error.user_message(),
                    },
                )
            }
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
