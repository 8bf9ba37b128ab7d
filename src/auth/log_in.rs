//! Defines the endpoint for signing in with an email and password.

use axum::{Json, extract::State};
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{AppState, Error, auth::token::encode_jwt, user::get_user_by_email};

/// The credentials entered during sign-in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: EmailAddress,
    pub password: String,
}

/// A route handler for sign-in requests. Returns a bearer token on success.
///
/// Unknown emails, wrong passwords and deactivated accounts all produce the
/// same error, so a caller cannot probe which emails are registered.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn log_in_endpoint(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<String>, Error> {
    let user = {
        let connection = state.db_connection.lock().unwrap();

        get_user_by_email(&credentials.email, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    if !user.is_active {
        return Err(Error::InvalidCredentials);
    }

    let password_is_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| {
            tracing::error!("Error verifying password: {}", error);
            Error::HashingError(error.to_string())
        })?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_jwt(&user, state.encoding_key()).map_err(|_| Error::TokenCreation)?;

    Ok(Json(token))
}
