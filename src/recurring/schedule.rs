//! The due-date calculator: pure calendar arithmetic that advances a
//! recurring category's schedule by one period.

use chrono::{DateTime, Days, Months, Utc};

use crate::models::Frequency;

/// Compute the next time a recurring category is due after `from`.
///
/// All arithmetic is calendar based, not fixed duration: a month is a
/// calendar month, a year is a calendar year. Month and year additions use
/// [chrono::Months], which clamps to the last day of the target month when
/// the day-of-month does not exist there, e.g. 2024-01-31 plus one month is
/// 2024-02-29. This is the pinned rollover rule.
///
/// The result is always strictly later than `from`.
pub fn next_occurrence(from: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    match frequency {
        Frequency::Daily => from + Days::new(1),
        Frequency::Weekly => from + Days::new(7),
        Frequency::Monthly => from + Months::new(1),
        Frequency::Quarterly => from + Months::new(3),
        Frequency::Yearly => from + Months::new(12),
    }
}
