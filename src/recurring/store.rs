//! The storage contract consumed by the recurring processor, and its SQLite
//! implementation.
//!
//! The contract is deliberately narrow: find what is due, and commit one
//! generation as an all-or-nothing unit. The processor never sees a database
//! connection, only this trait, so the temporal logic can be tested against
//! an in-memory fake.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::{
    Error,
    db::MapRow,
    models::{Category, DatabaseID, ScheduleCursor, Transaction, TransactionData},
};

/// Store operations needed by the recurring processor.
pub trait RecurringStore {
    /// All categories that should be processed now: recurring, active, and
    /// due (`next_processed_date <= now`). No ordering is guaranteed.
    fn due_categories(&self, now: DateTime<Utc>) -> Result<Vec<Category>, Error>;

    /// Persist one generated transaction and advance the category's schedule
    /// cursor, as a single atomic unit: either both writes become visible or
    /// neither does. The transaction write is ordered before the cursor
    /// advance, so a reader can never observe an advanced schedule without
    /// the corresponding transaction.
    ///
    /// # Errors
    ///
    /// Returns [Error::StaleCategory] (and rolls the unit back) if the
    /// category is no longer recurring by the time the unit commits.
    fn record_generation(
        &self,
        category_id: DatabaseID,
        transaction: TransactionData,
        cursor: ScheduleCursor,
    ) -> Result<Transaction, Error>;
}

/// A [RecurringStore] backed by the application's SQLite database.
///
/// The database is shared with the user-facing CRUD handlers; the atomic
/// unit uses an SQL transaction rather than assuming exclusive access.
#[derive(Clone)]
pub struct SqliteRecurringStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRecurringStore {
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl RecurringStore for SqliteRecurringStore {
    /// # Panics
    ///
    /// Panics if the lock for the database connection is already held by the same thread.
    fn due_categories(&self, now: DateTime<Utc>) -> Result<Vec<Category>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, name, description, icon, color, type, transaction_type,
                    is_recurring, frequency, default_amount, budget, is_active, is_default,
                    created_by, last_processed_date, next_processed_date
                FROM category
                WHERE transaction_type = 'recurring'
                    AND is_active = 1
                    AND next_processed_date <= :now",
            )?
            .query_map(&[(":now", &now)], Category::map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    /// # Panics
    ///
    /// Panics if the lock for the database connection is already held by the same thread.
    fn record_generation(
        &self,
        category_id: DatabaseID,
        transaction: TransactionData,
        cursor: ScheduleCursor,
    ) -> Result<Transaction, Error> {
        let mut connection = self.connection.lock().unwrap();
        let unit = connection.transaction()?;

        unit.execute(
            "INSERT INTO \"transaction\" (user_id, type, title, amount, category_id, description, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                transaction.user_id.as_i64(),
                transaction.transaction_type.as_str(),
                &transaction.title,
                transaction.amount,
                transaction.category_id,
                &transaction.description,
                transaction.date,
            ),
        )?;
        let transaction_id = unit.last_insert_rowid();

        // The guard refuses to advance the cursor of a category that was
        // switched to one-time while this run was in flight. Deactivation is
        // not guarded: a category deactivated mid-run may still complete the
        // one in-flight generation.
        let rows_updated = unit.execute(
            "UPDATE category SET last_processed_date = ?1, next_processed_date = ?2
            WHERE id = ?3 AND is_recurring = 1",
            (
                cursor.last_processed_date,
                cursor.next_processed_date,
                category_id,
            ),
        )?;

        if rows_updated == 0 {
            // Dropping the uncommitted unit rolls back the transaction insert.
            return Err(Error::StaleCategory);
        }

        unit.commit()?;

        Ok(transaction.into_transaction(transaction_id))
    }
}
