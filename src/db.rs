/*! This module defines traits for mapping between database rows and domain
types, along with the function that prepares a connection for use by the
application (schema creation and default data). */

use rusqlite::{Connection, Row, Transaction as SqlTransaction};

use crate::{
    Error,
    models::{Budget, Category, CategoryType, Transaction, TransactionType, User},
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns in the
    /// order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if
    /// an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type.
    ///
    /// The `offset` indicates which column the row should be read from.
    /// This is useful in cases where tables have been joined and you want to construct two
    /// different types from the one query.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Parse a TEXT column holding one of the closed string enumerations
/// (category type, transaction type, frequency, role).
pub(crate) fn parse_text_column<T>(row: &Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.get(index)?;

    raw.parse().map_err(|message: String| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            message.into(),
        )
    })
}

/// Like [parse_text_column] for nullable TEXT columns.
pub(crate) fn parse_optional_text_column<T>(
    row: &Row,
    index: usize,
) -> Result<Option<T>, rusqlite::Error>
where
    T: std::str::FromStr<Err = String>,
{
    match row.get::<_, Option<String>>(index)? {
        Some(raw) => raw.parse().map(Some).map_err(|message: String| {
            rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                message.into(),
            )
        }),
        None => Ok(None),
    }
}

/// Create the application schema on `connection` and seed the shared default
/// categories, all inside a single exclusive transaction.
///
/// Safe to call on an already initialized database.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    User::create_table(&transaction)?;
    Category::create_table(&transaction)?;
    Transaction::create_table(&transaction)?;
    Budget::create_table(&transaction)?;

    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// The categories every user sees without creating anything themselves.
///
/// All defaults are seeded as one-time categories: a shared category has no
/// owner to attribute generated transactions to, so marking one recurring
/// would leave it permanently unprocessable.
const DEFAULT_CATEGORIES: [(&str, &str, &str, &str, CategoryType); 8] = [
    (
        "Salary",
        "Regular salary income",
        "money",
        "#33FF57",
        CategoryType::Income,
    ),
    (
        "Freelance",
        "Freelance work income",
        "work",
        "#33FF57",
        CategoryType::Income,
    ),
    (
        "Investments",
        "Investment returns",
        "trending_up",
        "#33FF57",
        CategoryType::Income,
    ),
    (
        "Food & Dining",
        "Food and dining expenses",
        "restaurant",
        "#FF5733",
        CategoryType::Expense,
    ),
    (
        "Transportation",
        "Transport and fuel expenses",
        "directions_car",
        "#FF5733",
        CategoryType::Expense,
    ),
    (
        "Housing",
        "Rent and household expenses",
        "home",
        "#FF5733",
        CategoryType::Expense,
    ),
    (
        "Utilities",
        "Electricity, water and internet",
        "bolt",
        "#FF5733",
        CategoryType::Expense,
    ),
    (
        "Entertainment",
        "Leisure and entertainment expenses",
        "movie",
        "#FF5733",
        CategoryType::Expense,
    ),
];

fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let default_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM category WHERE is_default = 1",
        [],
        |row| row.get(0),
    )?;

    if default_count > 0 {
        return Ok(());
    }

    for (name, description, icon, color, category_type) in DEFAULT_CATEGORIES {
        connection.execute(
            "INSERT INTO category (
                name, description, icon, color, type, transaction_type,
                is_recurring, is_active, is_default
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 1, 1)",
            (
                name,
                description,
                icon,
                color,
                category_type.as_str(),
                TransactionType::OneTime.as_str(),
            ),
        )?;
    }

    Ok(())
}
