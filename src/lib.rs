//! Fintrack is a personal finance tracking API: users register, sign in and
//! manage their income/expense transactions, budgets and categories over
//! JSON/HTTP.
//!
//! Categories can be marked recurring with a frequency; a daily background
//! job (see [recurring]) materializes each due recurring category into a
//! concrete transaction and advances its schedule, with the transaction
//! insert and the schedule advance committed as one atomic unit.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod auth;
mod budget;
mod category;
mod db;
mod endpoints;
mod error;
mod logging;
pub mod models;
mod recurring;
mod routing;
mod state;
#[cfg(test)]
mod test_utils;
mod transaction;
mod user;

pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::logging_middleware;
pub use recurring::{
    RecurringJob, RecurringStore, RunOutcome, RunSummary, SqliteRecurringStore,
    start_recurring_job,
};
pub use routing::build_router;
pub use state::AppState;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
