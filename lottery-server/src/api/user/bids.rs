use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use lottery_core::processors::SubmitBids;
use lottery_sdk::objects::{SubmitBidsRequest, SubmitBidsResponse};
use uuid::Uuid;

use super::UserApiError;
use crate::state::AppState;

/// `POST /events/{id}/bids` — place bids for one participant.
///
/// Every candidate must lie within the event's bid range, otherwise nothing
/// is placed. Candidates past the participant's cap are counted as rejected.
/// Both checks run inside the ledger under the event's lock.
pub(super) async fn submit_bids(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<SubmitBidsRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    if request.participant.trim().is_empty() {
        return Err(UserApiError::BadRequest("participant must not be empty"));
    }

    let submitted = request.values.len();
    let accepted = state
        .ledger
        .process(SubmitBids {
            event_id,
            participant: request.participant,
            values: request.values,
        })
        .await?;

    Ok(Json(SubmitBidsResponse {
        accepted,
        rejected: submitted - accepted,
    }))
}
