//! The recurrence state machine for categories.
//!
//! Every mutation of a category (create or update) runs through
//! [resolve_recurrence] before the write is persisted. The function is the
//! single place that decides the recurrence fields, so `is_recurring`,
//! `frequency`, `default_amount` and the schedule cursor can never disagree
//! with `transaction_type` after a successful save. It is deliberately a
//! plain function rather than a storage-layer hook, so it can be audited and
//! tested without a database.

use chrono::{DateTime, Utc};

use crate::{
    Error,
    models::{Frequency, ScheduleCursor, TransactionType},
    recurring::next_occurrence,
};

/// The recurrence-related portion of a category, as decided by the state
/// machine. The caller merges these fields into the record it persists.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecurrenceFields {
    pub transaction_type: TransactionType,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    pub default_amount: Option<f64>,
    pub cursor: Option<ScheduleCursor>,
}

/// Decide the recurrence fields for a category that is about to be saved
/// with `transaction_type`.
///
/// `frequency` and `default_amount` are the values after any partial update
/// has been merged onto the existing record. `existing_cursor` is the
/// currently stored schedule cursor ([None] on create, or when the category
/// was one-time until now).
///
/// Rules:
/// - Recurring requires a frequency and a positive default amount.
/// - The first transition into recurring starts the schedule at `now`:
///   `lastProcessedDate = now`, `nextProcessedDate = next_occurrence(now)`.
/// - A category that is already recurring keeps its cursor; editing the
///   frequency or amount does not reset the schedule.
/// - Switching to one-time clears every recurrence field, regardless of
///   what the update supplied for them.
///
/// # Errors
///
/// Returns [Error::MissingFrequency] or [Error::InvalidDefaultAmount] when a
/// recurring category is missing its configuration. A merged update that
/// strips either field from an already-recurring category fails the same
/// way; the invariant is re-checked on every save, not just the first.
pub fn resolve_recurrence(
    transaction_type: TransactionType,
    frequency: Option<Frequency>,
    default_amount: Option<f64>,
    existing_cursor: Option<ScheduleCursor>,
    now: DateTime<Utc>,
) -> Result<RecurrenceFields, Error> {
    match transaction_type {
        TransactionType::Recurring => {
            let frequency = frequency.ok_or(Error::MissingFrequency)?;

            match default_amount {
                Some(amount) if amount > 0.0 => {}
                _ => return Err(Error::InvalidDefaultAmount),
            }

            let cursor = existing_cursor.unwrap_or_else(|| ScheduleCursor {
                last_processed_date: now,
                next_processed_date: next_occurrence(now, frequency),
            });

            Ok(RecurrenceFields {
                transaction_type,
                is_recurring: true,
                frequency: Some(frequency),
                default_amount,
                cursor: Some(cursor),
            })
        }
        TransactionType::OneTime => Ok(RecurrenceFields {
            transaction_type,
            is_recurring: false,
            frequency: None,
            default_amount: None,
            cursor: None,
        }),
    }
}

#[cfg(test)]
mod resolve_recurrence_tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::resolve_recurrence;
    use crate::{
        Error,
        models::{Frequency, ScheduleCursor, TransactionType},
        recurring::next_occurrence,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 7, 9, 0, 0).unwrap()
    }

    #[test]
    fn recurring_without_frequency_is_rejected() {
        let result = resolve_recurrence(
            TransactionType::Recurring,
            None,
            Some(100.0),
            None,
            now(),
        );

        assert_eq!(result, Err(Error::MissingFrequency));
    }

    #[test]
    fn recurring_without_amount_is_rejected() {
        let result = resolve_recurrence(
            TransactionType::Recurring,
            Some(Frequency::Monthly),
            None,
            None,
            now(),
        );

        assert_eq!(result, Err(Error::InvalidDefaultAmount));
    }

    #[test]
    fn recurring_with_non_positive_amount_is_rejected() {
        for amount in [0.0, -50.0] {
            let result = resolve_recurrence(
                TransactionType::Recurring,
                Some(Frequency::Monthly),
                Some(amount),
                None,
                now(),
            );

            assert_eq!(result, Err(Error::InvalidDefaultAmount));
        }
    }

    #[test]
    fn first_transition_into_recurring_starts_the_schedule() {
        let fields = resolve_recurrence(
            TransactionType::Recurring,
            Some(Frequency::Weekly),
            Some(250.0),
            None,
            now(),
        )
        .unwrap();

        assert!(fields.is_recurring);
        let cursor = fields.cursor.unwrap();
        assert_eq!(cursor.last_processed_date, now());
        assert_eq!(
            cursor.next_processed_date,
            next_occurrence(now(), Frequency::Weekly)
        );
    }

    #[test]
    fn editing_amount_or_frequency_keeps_the_existing_schedule() {
        let existing = ScheduleCursor {
            last_processed_date: Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
            next_processed_date: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
        };

        let fields = resolve_recurrence(
            TransactionType::Recurring,
            Some(Frequency::Daily),
            Some(42.0),
            Some(existing),
            now(),
        )
        .unwrap();

        assert_eq!(fields.cursor, Some(existing));
    }

    #[test]
    fn switching_to_one_time_clears_every_recurrence_field() {
        let existing = ScheduleCursor {
            last_processed_date: now(),
            next_processed_date: next_occurrence(now(), Frequency::Monthly),
        };

        let fields = resolve_recurrence(
            TransactionType::OneTime,
            Some(Frequency::Monthly),
            Some(500.0),
            Some(existing),
            now(),
        )
        .unwrap();

        assert!(!fields.is_recurring);
        assert_eq!(fields.frequency, None);
        assert_eq!(fields.default_amount, None);
        assert_eq!(fields.cursor, None);
    }
}
