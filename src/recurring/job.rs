//! The scheduler trigger: a background task that fires the recurring
//! processor once per day, plus the guard that keeps runs from overlapping.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::{
    Error,
    recurring::{RecurringStore, RunSummary, process_recurring_categories},
};

/// How often the background job fires. Runs happen once per day, matching
/// the finest supported frequency.
pub const DEFAULT_RUN_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// The result of asking for a processing run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Another run was still active; this trigger was skipped. Whatever the
    /// active run leaves unprocessed stays due and is picked up next time.
    AlreadyRunning,
}

/// The single entry point for recurring processing runs, shared by the
/// daily timer and the manual trigger endpoint.
///
/// The guard guarantees at most one active run: a trigger that arrives
/// while a run is in flight is skipped, never queued behind it.
pub struct RecurringJob<S> {
    store: S,
    guard: tokio::sync::Mutex<()>,
}

impl<S: RecurringStore> RecurringJob<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Run one processing cycle at `now`, unless a cycle is already active.
    ///
    /// # Errors
    ///
    /// Returns an error if the due-category query fails; failures inside
    /// individual category units are reported through the summary instead.
    pub fn run_once(&self, now: DateTime<Utc>) -> Result<RunOutcome, Error> {
        let Ok(_running) = self.guard.try_lock() else {
            tracing::warn!("a recurring processing run is already active, skipping this trigger");
            return Ok(RunOutcome::AlreadyRunning);
        };

        process_recurring_categories(&self.store, now).map(RunOutcome::Completed)
    }
}

/// Spawn the background task that fires `job` on a fixed daily cadence.
///
/// The first tick fires immediately, which doubles as a catch-up run after
/// downtime. A tick that lands while a run is still active is skipped by
/// the job's guard.
pub fn start_recurring_job<S>(job: Arc<RecurringJob<S>>)
where
    S: RecurringStore + Send + Sync + 'static,
{
    tokio::spawn(async move {
        tracing::info!("recurring category job started (24-hour interval)");

        let mut run_interval = interval(DEFAULT_RUN_INTERVAL);
        run_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            run_interval.tick().await;

            match job.run_once(Utc::now()) {
                Ok(RunOutcome::Completed(summary)) => tracing::info!(
                    "recurring run completed: {} processed, {} failed, {} skipped",
                    summary.processed,
                    summary.failed,
                    summary.skipped
                ),
                // Skips log inside run_once.
                Ok(RunOutcome::AlreadyRunning) => {}
                Err(error) => tracing::error!("recurring run failed: {}", error),
            }
        }
    });
}
