//! Implements the struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;

use crate::recurring::{RecurringJob, SqliteRecurringStore};

/// The pair of keys for signing and checking auth tokens, derived from one
/// secret.
#[derive(Clone)]
struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection, shared between the request handlers and the
    /// recurring job.
    pub db_connection: Arc<Mutex<Connection>>,
    jwt_keys: JwtKeys,
    /// The single entry point for recurring processing runs, shared between
    /// the daily timer and the manual trigger endpoint so their runs can
    /// never overlap.
    pub recurring_job: Arc<RecurringJob<SqliteRecurringStore>>,
}

impl AppState {
    /// Create a new [AppState] around an initialized database connection.
    pub fn new(db_connection: Arc<Mutex<Connection>>, jwt_secret: &str) -> Self {
        Self {
            recurring_job: Arc::new(RecurringJob::new(SqliteRecurringStore::new(
                db_connection.clone(),
            ))),
            db_connection,
            jwt_keys: JwtKeys {
                encoding_key: EncodingKey::from_secret(jwt_secret.as_ref()),
                decoding_key: DecodingKey::from_secret(jwt_secret.as_ref()),
            },
        }
    }

    /// The encoding key for auth tokens.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.jwt_keys.encoding_key
    }

    /// The decoding key for auth tokens.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.jwt_keys.decoding_key
    }
}
