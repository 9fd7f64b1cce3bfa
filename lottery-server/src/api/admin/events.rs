use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use lottery_core::entities::Event;
use lottery_sdk::objects::{CreateEventRequest, EventResponse, UpdateEventRequest};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::AppState;

use super::{AdminApiError, validate_event};

/// `GET /events` — every event, ordered by start instant.
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AdminApiError> {
    let mut events = state.store.list_all().await?;
    events.sort_by_key(|e| (e.start_at, e.id));

    let now = OffsetDateTime::now_utc();
    let response: Vec<EventResponse> = events.iter().map(|e| e.to_response(now)).collect();
    Ok(Json(response))
}

/// `GET /events/{id}` — one event with its bid pool.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    let event = state.store.get(id).await?.ok_or(AdminApiError::NotFound)?;
    Ok(Json(event.to_response(OffsetDateTime::now_utc())))
}

/// `POST /events` — create a draft.
///
/// Omitted fields take the draft defaults.
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let now = OffsetDateTime::now_utc();
    let mut event = Event::draft(request.title, now);
    event.description = request.description;
    event.prize = request.prize;
    event.channel = request.channel;
    event.creator = request.creator;
    if let Some(rule) = request.selection_rule {
        event.selection_rule = rule.into();
    }
    if let Some(start_at) = request.start_at {
        event.start_at = start_at;
    }
    if let Some(duration_ms) = request.duration_ms {
        event.duration_ms = duration_ms;
    }
    if let Some(repeat_interval_ms) = request.repeat_interval_ms {
        event.repeat_interval_ms = repeat_interval_ms;
    }
    if let Some(winner_count) = request.winner_count {
        event.winner_count = winner_count;
    }
    if let Some(max_bids_per_user) = request.max_bids_per_user {
        event.max_bids_per_user = max_bids_per_user;
    }
    if let Some(minimum_bid) = request.minimum_bid {
        event.minimum_bid = minimum_bid;
    }
    if let Some(maximum_bid) = request.maximum_bid {
        event.maximum_bid = maximum_bid;
    }
    validate_event(&event)?;

    let id = event.id;
    let response = event.to_response(now);
    state.store.upsert(event).await?;
    state.scheduler.update_schedule(id).await?;

    tracing::info!(event_id = %id, "Event created");
    Ok((StatusCode::CREATED, Json(response)))
}

/// `PUT /events/{id}` — replace the editable fields.
///
/// Bids, status and the announcement marker are kept.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    {
        let _guard = state.locks.lock(id).await;
        let mut event = state.store.get(id).await?.ok_or(AdminApiError::NotFound)?;

        event.title = request.title;
        event.description = request.description;
        event.prize = request.prize;
        event.channel = request.channel;
        event.selection_rule = request.selection_rule.into();
        event.start_at = request.start_at;
        event.duration_ms = request.duration_ms;
        event.repeat_interval_ms = request.repeat_interval_ms;
        event.winner_count = request.winner_count;
        event.max_bids_per_user = request.max_bids_per_user;
        event.minimum_bid = request.minimum_bid;
        event.maximum_bid = request.maximum_bid;
        validate_event(&event)?;

        state.store.upsert(event).await?;
    }

    let outcome = state.scheduler.update_schedule(id).await?;
    tracing::info!(event_id = %id, outcome = ?outcome, "Event updated");

    let event = state.store.get(id).await?.ok_or(AdminApiError::NotFound)?;
    Ok(Json(event.to_response(OffsetDateTime::now_utc())))
}

/// `DELETE /events/{id}` — delete an event together with its timers.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    let existed = {
        let _guard = state.locks.lock(id).await;
        state.store.delete(id).await?
    };
    if !existed {
        return Err(AdminApiError::NotFound);
    }

    state.scheduler.update_schedule(id).await?;
    tracing::info!(event_id = %id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}
