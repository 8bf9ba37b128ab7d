//! Defines the endpoint for registering a new user account.

use axum::{Json, extract::State, http::StatusCode};
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{
    AppState, Error,
    models::{PasswordHash, Role, User},
    user::insert_user,
};

/// The data for creating a new user account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
    pub password: String,
}

/// A route handler for registering a new user.
///
/// Every account registered through this endpoint gets the regular user
/// role; admins are created out of band.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_endpoint(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), Error> {
    let password_hash =
        PasswordHash::from_raw_password(&request.password, PasswordHash::DEFAULT_COST)?;

    let connection = state.db_connection.lock().unwrap();

    let user = insert_user(
        request.first_name.trim(),
        request.last_name.trim(),
        &request.email,
        password_hash,
        Role::User,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(user)))
}
