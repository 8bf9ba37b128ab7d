//! Transaction persistence and CRUD endpoints. The recurring processor
//! creates transactions through its own atomic unit; everything here is
//! driven by users.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    category::db::get_category,
    db::{CreateTable, MapRow, parse_text_column},
    models::{CategoryType, DatabaseID, Transaction, TransactionData, UserID},
};

impl CreateTable for Transaction {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                category_id INTEGER NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Transaction {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(offset)?,
            user_id: UserID::new(row.get(offset + 1)?),
            transaction_type: parse_text_column(row, offset + 2)?,
            title: row.get(offset + 3)?,
            amount: row.get(offset + 4)?,
            category_id: row.get(offset + 5)?,
            description: row.get(offset + 6)?,
            date: row.get(offset + 7)?,
        })
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, user_id, type, title, amount, category_id, description, date";

/// Insert a transaction into the database.
///
/// # Errors
/// Returns [Error::InvalidForeignKey] if the category does not exist or is
/// neither owned by the user nor a shared default.
pub fn insert_transaction(
    data: TransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = get_category(data.category_id, connection).map_err(|error| match error {
        // A 'not found' error does not make sense on an insert function, so
        // we instead indicate that the category id (a foreign key) is invalid.
        Error::NotFound => Error::InvalidForeignKey,
        error => error,
    })?;

    // The server should not reveal whether a category exists but belongs to
    // someone else, so this gets the same error as a nonexistent category.
    if !category.is_default && category.created_by != Some(data.user_id) {
        return Err(Error::InvalidForeignKey);
    }

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, type, title, amount, category_id, description, date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            data.user_id.as_i64(),
            data.transaction_type.as_str(),
            &data.title,
            data.amount,
            data.category_id,
            &data.description,
            data.date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(data.into_transaction(id))
}

/// Retrieve a transaction by its ID.
pub fn get_transaction(
    transaction_id: DatabaseID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &transaction_id)], Transaction::map_row)
        .map_err(|error| error.into())
}

/// Retrieve `owner`'s transactions, or everyone's when `owner` is [None]
/// (admin access), newest first.
pub fn list_transactions(
    owner: Option<UserID>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (sql, params) = match owner {
        Some(user_id) => (
            format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
                WHERE user_id = ? ORDER BY date DESC, id DESC"
            ),
            vec![user_id.as_i64()],
        ),
        None => (
            format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" ORDER BY date DESC, id DESC"
            ),
            Vec::new(),
        ),
    };

    connection
        .prepare(&sql)?
        .query_map(rusqlite::params_from_iter(params), Transaction::map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

fn delete_transaction(transaction_id: DatabaseID, connection: &Connection) -> Result<(), Error> {
    let rows_deleted =
        connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", (transaction_id,))?;

    if rows_deleted == 0 {
        Err(Error::NotFound)
    } else {
        Ok(())
    }
}

/// The data for creating a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub title: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: CategoryType,
    #[serde(rename = "category")]
    pub category_id: DatabaseID,
    pub description: Option<String>,
    /// Defaults to the current time when omitted.
    pub date: Option<DateTime<Utc>>,
}

/// A partial update of a transaction.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// A route handler for creating a new transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let data = TransactionData {
        user_id: claims.user_id(),
        transaction_type: request.transaction_type,
        title: request.title,
        amount: request.amount,
        category_id: request.category_id,
        description: request.description,
        date: request.date.unwrap_or_else(Utc::now),
    };

    let connection = state.db_connection.lock().unwrap();

    insert_transaction(data, &connection)
        .map(|transaction| (StatusCode::CREATED, Json(transaction)))
}

/// A route handler for getting a transaction by its ID.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transaction_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let transaction = get_transaction(transaction_id, &connection)?;

    if claims.is_admin() || transaction.user_id == claims.user_id() {
        Ok(Json(transaction))
    } else {
        // Respond with 404 so that users cannot know whether another user's
        // transaction exists.
        Err(Error::NotFound)
    }
}

/// A route handler for listing the caller's transactions (or everyone's for
/// admins).
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_transactions_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Transaction>>, Error> {
    let owner = if claims.is_admin() {
        None
    } else {
        Some(claims.user_id())
    };

    let connection = state.db_connection.lock().unwrap();

    list_transactions(owner, &connection).map(Json)
}

/// A route handler for updating a transaction's user-editable fields.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let existing = get_transaction(transaction_id, &connection)?;

    if existing.user_id != claims.user_id() && !claims.is_admin() {
        return Err(Error::NotFound);
    }

    let mut updated = existing;
    if let Some(title) = request.title {
        updated.title = title;
    }
    if let Some(amount) = request.amount {
        updated.amount = amount;
    }
    if let Some(description) = request.description {
        updated.description = Some(description);
    }
    if let Some(date) = request.date {
        updated.date = date;
    }

    connection.execute(
        "UPDATE \"transaction\" SET title = ?1, amount = ?2, description = ?3, date = ?4
        WHERE id = ?5",
        (
            &updated.title,
            updated.amount,
            &updated.description,
            updated.date,
            updated.id,
        ),
    )?;

    Ok(Json(updated))
}

/// A route handler for deleting a transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<serde_json::Value>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let transaction = get_transaction(transaction_id, &connection)?;

    if transaction.user_id != claims.user_id() && !claims.is_admin() {
        return Err(Error::NotFound);
    }

    delete_transaction(transaction_id, &connection)?;

    Ok(Json(
        serde_json::json!({ "message": "Transaction deleted successfully" }),
    ))
}
