//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid email/password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred in the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server,
    /// clients get a generic internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email used to register is already taken.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// An empty string was used as a category name.
    #[error("name is required and cannot be empty")]
    EmptyCategoryName,

    /// A recurring category was created or updated without a frequency.
    #[error("frequency is required for recurring categories")]
    MissingFrequency,

    /// A recurring category was created or updated without a positive
    /// default amount.
    #[error("default amount must be positive for recurring categories")]
    InvalidDefaultAmount,

    /// A budget's end date is not after its start date.
    #[error("end date must be after start date")]
    InvalidDateRange,

    /// A referenced row (e.g. the category of a transaction) does not exist
    /// or belongs to another user.
    #[error("a referenced resource does not exist")]
    InvalidForeignKey,

    /// The authenticated user is not allowed to touch this resource.
    #[error("not authorized to access this resource")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The category changed under the recurring processor (e.g. it was
    /// switched to one-time mid-run) and the generation unit was rolled back.
    #[error("the category changed while being processed, generation rolled back")]
    StaleCategory,

    /// An auth token could not be created.
    #[error("token creation error")]
    TokenCreation,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
                Error::InvalidForeignKey
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
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
        let status = match self {
            Error::TooWeak(_)
            | Error::DuplicateEmail
            | Error::EmptyCategoryName
            | Error::MissingFrequency
            | Error::InvalidDefaultAmount
            | Error::InvalidDateRange
            | Error::InvalidForeignKey => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            // Any errors not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                let body = Json(json!({ "error": "Internal server error" }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
