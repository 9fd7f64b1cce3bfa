use axum::{Json, extract::State, response::IntoResponse};
use lottery_sdk::objects::ActiveEventResponse;
use time::OffsetDateTime;

use super::UserApiError;
use crate::state::AppState;

/// `GET /events` — published events that still have a draw ahead, soonest first.
pub(super) async fn list_active_events(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, UserApiError> {
    let now = OffsetDateTime::now_utc();
    let mut active: Vec<ActiveEventResponse> = state
        .store
        .list_published()
        .await?
        .iter()
        .filter_map(|event| event.to_active_response(now))
        .collect();
    active.sort_by_key(|e| (e.next_draw_at, e.id));
    Ok(Json(active))
}
