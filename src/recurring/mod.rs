//! The recurring transaction generation subsystem.
//!
//! Categories marked recurring carry a schedule cursor; once a day (or on a
//! manual trigger) the processor queries every active recurring category
//! whose `next_processed_date` has passed, generates one transaction per
//! due category, and advances its cursor, each category as an atomic
//! all-or-nothing unit against the store.

mod job;
mod processor;
mod run_endpoint;
mod schedule;
mod store;

pub use job::{DEFAULT_RUN_INTERVAL, RecurringJob, RunOutcome, start_recurring_job};
pub use processor::{RunSummary, process_recurring_categories};
pub use run_endpoint::process_recurring_endpoint;
pub use schedule::next_occurrence;
pub use store::{RecurringStore, SqliteRecurringStore};
