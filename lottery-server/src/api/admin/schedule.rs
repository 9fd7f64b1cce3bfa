use axum::{Json, extract::State, response::IntoResponse};
use lottery_sdk::objects::{ReconcileResponse, ScheduledJobResponse};

use crate::state::AppState;

use super::AdminApiError;

/// `GET /schedule` — armed timers, soonest first.
pub async fn show_schedule(State(state): State<AppState>) -> impl IntoResponse {
    let jobs: Vec<ScheduledJobResponse> = state
        .scheduler
        .armed_jobs()
        .into_iter()
        .map(Into::into)
        .collect();
    Json(jobs)
}

/// `POST /reconcile` — drop every timer and rebuild from the store.
pub async fn reconcile(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AdminApiError> {
    let armed_events = state.scheduler.reconcile_all().await?;
    let jobs = state
        .scheduler
        .armed_jobs()
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(ReconcileResponse { armed_events, jobs }))
}
