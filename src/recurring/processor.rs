//! The recurring processor: turns every due recurring category into one
//! concrete transaction and advances its schedule.
//!
//! Each category is processed as an isolated unit: a failure is logged and
//! counted, never propagated, so one broken category cannot starve the rest
//! of the run. The current time is a parameter, which keeps every due-date
//! decision deterministic under test.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    Error,
    models::{Category, ScheduleCursor, Transaction, TransactionData},
    recurring::{RecurringStore, next_occurrence},
};

/// What one processing cycle did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Categories turned into a transaction with their schedule advanced.
    pub processed: usize,
    /// Categories whose generation unit failed; they stay due and are
    /// retried on the next cycle.
    pub failed: usize,
    /// Categories that cannot generate at all (no owner to attribute the
    /// transaction to).
    pub skipped: usize,
}

/// Process every recurring category that is due at `now`.
///
/// # Errors
///
/// This function only returns an error when the due-category query itself
/// fails; per-category failures are logged and tallied in the summary.
pub fn process_recurring_categories<S: RecurringStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<RunSummary, Error> {
    let due = store.due_categories(now)?;

    tracing::info!("processing {} due recurring categories", due.len());

    let mut summary = RunSummary::default();

    for category in due {
        match process_category(store, &category, now) {
            Ok(Some(transaction)) => {
                tracing::debug!(
                    "generated transaction {} for recurring category {}",
                    transaction.id,
                    category.id
                );
                summary.processed += 1;
            }
            Ok(None) => summary.skipped += 1,
            Err(error) => {
                tracing::error!(
                    "error processing recurring category {}: {}",
                    category.id,
                    error
                );
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Generate the transaction for one due category and advance its cursor,
/// through the store's atomic unit.
///
/// Returns `Ok(None)` for categories that can never generate (shared
/// defaults without an owner).
fn process_category<S: RecurringStore>(
    store: &S,
    category: &Category,
    now: DateTime<Utc>,
) -> Result<Option<Transaction>, Error> {
    let Some(owner) = category.created_by else {
        tracing::warn!(
            "recurring category {} has no owner to attribute transactions to, skipping",
            category.id
        );
        return Ok(None);
    };

    let frequency = category.frequency.ok_or(Error::MissingFrequency)?;
    let amount = match category.default_amount {
        Some(amount) if amount > 0.0 => amount,
        _ => return Err(Error::InvalidDefaultAmount),
    };

    let transaction = TransactionData {
        user_id: owner,
        transaction_type: category.category_type,
        title: category.name.to_string(),
        amount,
        category_id: category.id,
        description: Some(format!("Recurring {}", category.name)),
        date: now,
    };

    let cursor = ScheduleCursor {
        last_processed_date: now,
        next_processed_date: next_occurrence(now, frequency),
    };

    store
        .record_generation(category.id, transaction, cursor)
        .map(Some)
}
