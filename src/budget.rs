//! Budget persistence and CRUD endpoints.

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
    db::{CreateTable, MapRow},
    models::{Budget, BudgetData, DatabaseID, UserID},
};

impl CreateTable for Budget {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                \"limit\" REAL NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Budget {
    type ReturnType = Self;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(offset)?,
            user_id: UserID::new(row.get(offset + 1)?),
            category_id: row.get(offset + 2)?,
            limit: row.get(offset + 3)?,
            start_date: row.get(offset + 4)?,
            end_date: row.get(offset + 5)?,
        })
    }
}

const BUDGET_COLUMNS: &str = "id, user_id, category_id, \"limit\", start_date, end_date";

fn insert_budget(data: BudgetData, connection: &Connection) -> Result<Budget, Error> {
    if data.end_date <= data.start_date {
        return Err(Error::InvalidDateRange);
    }

    connection.execute(
        "INSERT INTO budget (user_id, category_id, \"limit\", start_date, end_date)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            data.user_id.as_i64(),
            data.category_id,
            data.limit,
            data.start_date,
            data.end_date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(data.into_budget(id))
}

fn get_budget(budget_id: DatabaseID, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(&format!("SELECT {BUDGET_COLUMNS} FROM budget WHERE id = :id"))?
        .query_row(&[(":id", &budget_id)], Budget::map_row)
        .map_err(|error| error.into())
}

fn list_budgets(owner: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE user_id = :user_id ORDER BY start_date"
        ))?
        .query_map(&[(":user_id", &owner.as_i64())], Budget::map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// The data for creating a budget.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    #[serde(rename = "category")]
    pub category_id: DatabaseID,
    pub limit: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// A partial update of a budget.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetRequest {
    pub limit: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// A route handler for creating a new budget.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_budget_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    let data = BudgetData {
        user_id: claims.user_id(),
        category_id: request.category_id,
        limit: request.limit,
        start_date: request.start_date,
        end_date: request.end_date,
    };

    let connection = state.db_connection.lock().unwrap();

    insert_budget(data, &connection).map(|budget| (StatusCode::CREATED, Json(budget)))
}

/// A route handler for getting a budget by its ID.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_budget_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Json<Budget>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let budget = get_budget(budget_id, &connection)?;

    if claims.is_admin() || budget.user_id == claims.user_id() {
        Ok(Json(budget))
    } else {
        Err(Error::NotFound)
    }
}

/// A route handler for listing the caller's budgets.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_budgets_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = state.db_connection.lock().unwrap();

    list_budgets(claims.user_id(), &connection).map(Json)
}

/// A route handler for updating a budget.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_budget_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
    Json(request): Json<UpdateBudgetRequest>,
) -> Result<Json<Budget>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let existing = get_budget(budget_id, &connection)?;

    if existing.user_id != claims.user_id() && !claims.is_admin() {
        return Err(Error::NotFound);
    }

    let updated = Budget {
        limit: request.limit.unwrap_or(existing.limit),
        start_date: request.start_date.unwrap_or(existing.start_date),
        end_date: request.end_date.unwrap_or(existing.end_date),
        id: existing.id,
        user_id: existing.user_id,
        category_id: existing.category_id,
    };

    if updated.end_date <= updated.start_date {
        return Err(Error::InvalidDateRange);
    }

    connection.execute(
        "UPDATE budget SET \"limit\" = ?1, start_date = ?2, end_date = ?3 WHERE id = ?4",
        (updated.limit, updated.start_date, updated.end_date, updated.id),
    )?;

    Ok(Json(updated))
}

/// A route handler for deleting a budget.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_budget_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Json<serde_json::Value>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let budget = get_budget(budget_id, &connection)?;

    if budget.user_id != claims.user_id() && !claims.is_admin() {
        return Err(Error::NotFound);
    }

    connection.execute("DELETE FROM budget WHERE id = ?1", (budget_id,))?;

    Ok(Json(
        serde_json::json!({ "message": "Budget deleted successfully" }),
    ))
}
