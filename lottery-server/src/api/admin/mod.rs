//! Admin API handlers.
//!
//! Every mutation is written under the event's lock and followed by
//! `update_schedule`, so timers always reflect the stored event.
//!
//! # Endpoints
//!
//! - `GET    /events`                – list every event, drafts included
//! - `POST   /events`                – create a draft
//! - `GET    /events/{id}`           – show one event with its bids
//! - `PUT    /events/{id}`           – replace the editable fields
//! - `DELETE /events/{id}`           – delete an event and its timers
//! - `POST   /events/{id}/publish`   – move a draft to published
//! - `POST   /events/{id}/unpublish` – move an event back to draft
//! - `GET    /schedule`              – armed timers
//! - `POST   /reconcile`             – rebuild every timer from the store

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use lottery_core::entities::Event;
use lottery_core::processors::SchedulerError;
use lottery_core::store::StoreError;

use crate::state::AppState;

mod events;
mod publish;
mod schedule;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/{id}/publish", post(publish::publish_event))
        .route("/events/{id}/unpublish", post(publish::unpublish_event))
        .route("/schedule", get(schedule::show_schedule))
        .route("/reconcile", post(schedule::reconcile))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Store(StoreError),
    Scheduler(SchedulerError),
    NotFound,
    Invalid(String),
}

impl From<StoreError> for AdminApiError {
    fn from(e: StoreError) -> Self {
        AdminApiError::Store(e)
    }
}

impl From<SchedulerError> for AdminApiError {
    fn from(e: SchedulerError) -> Self {
        AdminApiError::Scheduler(e)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::Store(e) => {
                tracing::error!(error = %e, "Admin API store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::Scheduler(e) => {
                tracing::error!(error = %e, "Admin API scheduler error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::NotFound => (StatusCode::NOT_FOUND, "event not found").into_response(),
            AdminApiError::Invalid(reason) => (StatusCode::BAD_REQUEST, reason).into_response(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject events the scheduler or the ledger could not work with.
pub(crate) fn validate_event(event: &Event) -> Result<(), AdminApiError> {
    if event.title.trim().is_empty() {
        return Err(AdminApiError::Invalid("title must not be empty".to_string()));
    }
    if event.duration_ms == 0 {
        return Err(AdminApiError::Invalid(
            "duration_ms must be greater than zero".to_string(),
        ));
    }
    let Some(first_draw) = event.first_draw_at() else {
        return Err(AdminApiError::Invalid(
            "start_at + duration_ms is out of range".to_string(),
        ));
    };
    if event.repeats() {
        if event.repeat_interval_ms <= event.duration_ms {
            return Err(AdminApiError::Invalid(format!(
                "repeat_interval_ms {} must exceed duration_ms {}",
                event.repeat_interval_ms, event.duration_ms
            )));
        }
        if first_draw.checked_add(event.repeat_interval()).is_none() {
            return Err(AdminApiError::Invalid(
                "repeat_interval_ms is out of range".to_string(),
            ));
        }
    }
    if event.winner_count == 0 {
        return Err(AdminApiError::Invalid(
            "winner_count must be at least 1".to_string(),
        ));
    }
    if event.minimum_bid > event.maximum_bid {
        return Err(AdminApiError::Invalid(format!(
            "minimum_bid {} is above maximum_bid {}",
            event.minimum_bid, event.maximum_bid
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::api::test_support::send;
    use crate::server::build_router;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use serde_json::json;

    fn future_start() -> String {
        let start = time::OffsetDateTime::now_utc() + time::Duration::hours(1);
        start
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap()
    }

    async fn create(state: &AppState, body: serde_json::Value) -> serde_json::Value {
        let (status, created) = send(build_router(state.clone()), "POST", "/admin/events", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        created
    }

    #[tokio::test]
    async fn test_create_starts_as_unscheduled_draft() {
        let state = AppState::in_memory();
        let created = create(
            &state,
            json!({ "title": "Fortnightly raffle", "repeat_interval_ms": 1_209_600_000u64 }),
        )
        .await;

        assert_eq!(created["status"], "draft");
        assert_eq!(created["selection_rule"], "SIMPLE");
        assert_eq!(created["duration_ms"], 604_800_000u64);
        assert!(state.scheduler.armed_jobs().is_empty());

        let (status, listed) = send(build_router(state.clone()), "GET", "/admin/events", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_bid_range_is_rejected() {
        let state = AppState::in_memory();
        let (status, _) = send(
            build_router(state),
            "POST",
            "/admin/events",
            Some(json!({ "title": "Broken", "minimum_bid": 10, "maximum_bid": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overlapping_repeat_interval_is_rejected() {
        let state = AppState::in_memory();
        for repeat_interval_ms in [3_600_000u64, 1_800_000] {
            let (status, _) = send(
                build_router(state.clone()),
                "POST",
                "/admin/events",
                Some(json!({
                    "title": "Overlapping",
                    "duration_ms": 3_600_000u64,
                    "repeat_interval_ms": repeat_interval_ms
                })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "repeat {repeat_interval_ms}");
        }

        let created = create(
            &state,
            json!({ "title": "Hourly", "duration_ms": 3_600_000u64, "repeat_interval_ms": 3_600_001u64 }),
        )
        .await;
        assert_eq!(created["repeat_interval_ms"], 3_600_001u64);
    }

    #[tokio::test]
    async fn test_unrepresentable_schedule_is_rejected_and_not_stored() {
        let state = AppState::in_memory();
        let (status, _) = send(
            build_router(state.clone()),
            "POST",
            "/admin/events",
            Some(json!({ "title": "Forever", "duration_ms": 9_000_000_000_000_000u64 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let created = create(&state, json!({ "title": "Stretch me", "start_at": future_start() })).await;
        let id = created["id"].as_str().unwrap().to_string();
        send(
            build_router(state.clone()),
            "POST",
            &format!("/admin/events/{id}/publish"),
            None,
        )
        .await;

        let (status, _) = send(
            build_router(state.clone()),
            "PUT",
            &format!("/admin/events/{id}"),
            Some(json!({
                "title": "Stretched",
                "selection_rule": "SIMPLE",
                "start_at": future_start(),
                "duration_ms": 3_600_000u64,
                "repeat_interval_ms": 9_000_000_000_000_000u64,
                "winner_count": 1,
                "max_bids_per_user": 1,
                "minimum_bid": 1,
                "maximum_bid": 10
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, listed) = send(build_router(state.clone()), "GET", "/admin/events", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["title"], "Stretch me");
        assert_eq!(state.scheduler.reconcile_all().await.unwrap(), 1);
        state.scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_publish_arms_and_unpublish_clears() {
        let state = AppState::in_memory();
        let created = create(&state, json!({ "title": "Launch", "start_at": future_start() })).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, published) = send(
            build_router(state.clone()),
            "POST",
            &format!("/admin/events/{id}/publish"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(published["status"], "published");

        let (_, schedule) = send(build_router(state.clone()), "GET", "/admin/schedule", None).await;
        let kinds: Vec<&str> = schedule
            .as_array()
            .unwrap()
            .iter()
            .map(|job| job["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["announce", "draw"]);

        let (status, _) = send(
            build_router(state.clone()),
            "POST",
            &format!("/admin/events/{id}/unpublish"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.scheduler.armed_jobs().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_bids_and_reschedules() {
        let state = AppState::in_memory();
        let created = create(&state, json!({ "title": "Edit me", "start_at": future_start() })).await;
        let id = created["id"].as_str().unwrap().to_string();
        send(
            build_router(state.clone()),
            "POST",
            &format!("/admin/events/{id}/publish"),
            None,
        )
        .await;
        let (status, _) = send(
            build_router(state.clone()),
            "POST",
            &format!("/events/{id}/bids"),
            Some(json!({ "participant": "alice", "values": [4] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let later = time::OffsetDateTime::now_utc() + time::Duration::days(2);
        let (status, updated) = send(
            build_router(state.clone()),
            "PUT",
            &format!("/admin/events/{id}"),
            Some(json!({
                "title": "Edited",
                "selection_rule": "LOWEST_UNIQUE",
                "start_at": later.format(&time::format_description::well_known::Rfc3339).unwrap(),
                "duration_ms": 3_600_000u64,
                "repeat_interval_ms": 0,
                "winner_count": 1,
                "max_bids_per_user": 3,
                "minimum_bid": 1,
                "maximum_bid": 100
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Edited");
        assert_eq!(updated["status"], "published");
        assert_eq!(updated["bids"].as_array().unwrap().len(), 1);

        let draw = state
            .scheduler
            .armed_jobs()
            .into_iter()
            .find(|job| job.kind == lottery_core::processors::JobKind::Draw)
            .unwrap();
        assert!(draw.fire_at > later);
    }

    #[tokio::test]
    async fn test_delete_and_unknown_ids() {
        let state = AppState::in_memory();
        let created = create(&state, json!({ "title": "Short lived", "start_at": future_start() })).await;
        let id = created["id"].as_str().unwrap().to_string();
        send(
            build_router(state.clone()),
            "POST",
            &format!("/admin/events/{id}/publish"),
            None,
        )
        .await;
        assert_eq!(state.scheduler.armed_jobs().len(), 2);

        let (status, _) = send(
            build_router(state.clone()),
            "DELETE",
            &format!("/admin/events/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.scheduler.armed_jobs().is_empty());

        let (status, _) = send(
            build_router(state.clone()),
            "DELETE",
            &format!("/admin/events/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            build_router(state),
            "POST",
            &format!("/admin/events/{}/publish", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reconcile_reports_armed_events() {
        let state = AppState::in_memory();
        for title in ["One", "Two"] {
            let created = create(&state, json!({ "title": title, "start_at": future_start() })).await;
            let id = created["id"].as_str().unwrap().to_string();
            send(
                build_router(state.clone()),
                "POST",
                &format!("/admin/events/{id}/publish"),
                None,
            )
            .await;
        }

        let (status, body) = send(build_router(state.clone()), "POST", "/admin/reconcile", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["armed_events"], 2);
        assert_eq!(body["jobs"].as_array().unwrap().len(), 4);
        state.scheduler.shutdown();
    }
}
