//! User API handlers.
//!
//! These endpoints are called by participants.
//!
//! # Endpoints
//!
//! - `GET  /events`            – list events with a draw ahead
//! - `POST /events/{id}/bids`  – place bids on an event

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use lottery_core::processors::LedgerError;
use lottery_core::store::StoreError;

use crate::state::AppState;

mod bids;
mod events;

/// Build the User API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_active_events))
        .route("/events/{id}/bids", post(bids::submit_bids))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in User API handlers.
#[derive(Debug)]
enum UserApiError {
    /// A store operation failed.
    Store(StoreError),
    /// The requested event was not found.
    NotFound,
    /// The event is still a draft.
    NotPublished,
    /// A candidate value is outside the event's bid range.
    OutOfRange { value: i64, minimum: i64, maximum: i64 },
    /// The request itself is malformed.
    BadRequest(&'static str),
}

impl From<StoreError> for UserApiError {
    fn from(e: StoreError) -> Self {
        UserApiError::Store(e)
    }
}

impl From<LedgerError> for UserApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Store(e) => UserApiError::Store(e),
            LedgerError::NotFound(_) => UserApiError::NotFound,
            LedgerError::NotPublished(_) => UserApiError::NotPublished,
            LedgerError::OutOfRange {
                value,
                minimum,
                maximum,
            } => UserApiError::OutOfRange {
                value,
                minimum,
                maximum,
            },
        }
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            UserApiError::Store(e) => {
                tracing::error!(error = %e, "User API store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            UserApiError::NotFound => (StatusCode::NOT_FOUND, "event not found").into_response(),
            UserApiError::NotPublished => {
                (StatusCode::CONFLICT, "event is not open for bids").into_response()
            }
            UserApiError::OutOfRange {
                value,
                minimum,
                maximum,
            } => (
                StatusCode::BAD_REQUEST,
                format!("bid {value} is outside the allowed range {minimum}..={maximum}"),
            )
                .into_response(),
            UserApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason).into_response(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::api::test_support::send;
    use crate::server::build_router;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use lottery_core::entities::{Event, EventStatus};
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    async fn seed(state: &AppState, configure: impl FnOnce(&mut Event)) -> Event {
        let mut event = Event::draft("Participant test", OffsetDateTime::now_utc());
        event.start_at = OffsetDateTime::now_utc() + Duration::hours(1);
        event.status = EventStatus::Published;
        configure(&mut event);
        state.store.upsert(event.clone()).await.unwrap();
        event
    }

    #[tokio::test]
    async fn test_bids_report_accepted_and_rejected() {
        let state = AppState::in_memory();
        let event = seed(&state, |e| e.max_bids_per_user = 2).await;

        let (status, body) = send(
            build_router(state.clone()),
            "POST",
            &format!("/events/{}/bids", event.id),
            Some(json!({ "participant": "alice", "values": [3, 9, 27] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], 2);
        assert_eq!(body["rejected"], 1);
        let stored = state.store.get(event.id).await.unwrap().unwrap();
        assert_eq!(stored.bid_count_of("alice"), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_rejects_whole_request() {
        let state = AppState::in_memory();
        let event = seed(&state, |e| {
            e.max_bids_per_user = 5;
            e.maximum_bid = 10;
        })
        .await;

        let (status, _) = send(
            build_router(state.clone()),
            "POST",
            &format!("/events/{}/bids", event.id),
            Some(json!({ "participant": "bob", "values": [1, 11] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.store.get(event.id).await.unwrap().unwrap().bids.is_empty());
    }

    #[tokio::test]
    async fn test_draft_and_unknown_events() {
        let state = AppState::in_memory();
        let draft = seed(&state, |e| e.status = EventStatus::Draft).await;

        let (status, _) = send(
            build_router(state.clone()),
            "POST",
            &format!("/events/{}/bids", draft.id),
            Some(json!({ "participant": "carol", "values": [1] })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            build_router(state),
            "POST",
            &format!("/events/{}/bids", uuid::Uuid::new_v4()),
            Some(json!({ "participant": "carol", "values": [1] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_active_list_skips_drafts_and_expired() {
        let state = AppState::in_memory();
        let open = seed(&state, |_| {}).await;
        seed(&state, |e| e.status = EventStatus::Draft).await;
        seed(&state, |e| {
            e.start_at = OffsetDateTime::now_utc() - Duration::days(30);
            e.duration_ms = 60_000;
        })
        .await;

        let (status, body) = send(build_router(state), "GET", "/events", None).await;

        assert_eq!(status, StatusCode::OK);
        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], open.id.to_string());
        assert!(listed[0].get("bids").is_none());
    }
}
