//! Helpers shared by endpoint tests.

use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState,
    auth::encode_jwt,
    db::initialize,
    models::{PasswordHash, Role},
    routing::build_router,
    user::insert_user,
};

/// Create an [AppState] backed by a fresh in-memory database.
pub fn test_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    AppState::new(Arc::new(Mutex::new(connection)), "42")
}

/// Create a test server running the full application router.
pub fn test_server() -> (TestServer, AppState) {
    let state = test_state();
    let server = TestServer::new(build_router(state.clone()));

    (server, state)
}

/// Register a user through the API and sign them in, returning their token.
pub async fn register_test_user(server: &TestServer, email: &str, password: &str) -> String {
    server
        .post("/api/auth/register")
        .content_type("application/json")
        .json(&json!({
            "firstName": "Test",
            "lastName": "User",
            "email": email,
            "password": password,
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/auth/login")
        .content_type("application/json")
        .json(&json!({
            "email": email,
            "password": password,
        }))
        .await;

    response.assert_status_ok();
    response.json::<String>()
}

/// Insert an admin user directly into the database (admins cannot register
/// through the API) and return a token for them.
pub fn insert_admin_and_token(state: &AppState) -> String {
    let connection = state.db_connection.lock().unwrap();

    let admin = insert_user(
        "Admin",
        "User",
        &"admin@example.com".parse().unwrap(),
        PasswordHash::new_unchecked("notarealhash"),
        Role::Admin,
        &connection,
    )
    .expect("Could not insert admin user.");

    encode_jwt(&admin, state.encoding_key()).expect("Could not create admin token.")
}
