//! Defines the endpoint for manually triggering a recurring processing run,
//! for operational and testing use. Admin only.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::{AppState, auth::Claims, recurring::RunOutcome};

/// A route handler that runs one recurring processing cycle immediately.
///
/// This is the same entry point the daily timer calls; the shared guard
/// means a manual trigger can never overlap a scheduled run.
pub async fn process_recurring_endpoint(State(state): State<AppState>, claims: Claims) -> Response {
    if let Err(error) = claims.require_admin() {
        return error.into_response();
    }

    match state.recurring_job.run_once(Utc::now()) {
        Ok(RunOutcome::Completed(summary)) => (StatusCode::OK, Json(summary)).into_response(),
        Ok(RunOutcome::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "a recurring processing run is already in progress" })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}
