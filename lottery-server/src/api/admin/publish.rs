use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use lottery_core::entities::EventStatus;
use lottery_sdk::objects::EventResponse;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::AppState;

use super::AdminApiError;

/// `POST /events/{id}/publish` — start watching an event.
pub async fn publish_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    set_status(&state, id, EventStatus::Published).await
}

/// `POST /events/{id}/unpublish` — move an event back to draft and drop its timers.
pub async fn unpublish_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    set_status(&state, id, EventStatus::Draft).await
}

async fn set_status(
    state: &AppState,
    id: Uuid,
    status: EventStatus,
) -> Result<Json<EventResponse>, AdminApiError> {
    {
        let _guard = state.locks.lock(id).await;
        let mut event = state.store.get(id).await?.ok_or(AdminApiError::NotFound)?;
        if event.status != status {
            event.status = status;
            state.store.upsert(event).await?;
        }
    }

    let outcome = state.scheduler.update_schedule(id).await?;
    tracing::info!(event_id = %id, status = ?status, outcome = ?outcome, "Event status set");

    let event = state.store.get(id).await?.ok_or(AdminApiError::NotFound)?;
    Ok(Json(event.to_response(OffsetDateTime::now_utc())))
}
