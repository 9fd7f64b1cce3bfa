//! Bid intake request and response types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for placing one or more bids on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBidsRequest {
    /// Identifier of the participant placing the bids.
    pub participant: String,
    /// Candidate values, accepted in order until the participant's cap is hit.
    pub values: Vec<i64>,
}

/// Response telling the participant how many candidates were taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBidsResponse {
    pub accepted: usize,
    /// Candidates dropped because the per-participant cap was reached.
    pub rejected: usize,
}

/// A single placed bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidResponse {
    pub id: Uuid,
    pub participant: String,
    pub value: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub placed_at: OffsetDateTime,
}
