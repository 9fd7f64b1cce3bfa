//! BidLedger processor.
//!
//! Appends bids to an event's pool, enforcing the per-participant cap.
//! Submissions are not idempotent: submitting the same values twice places
//! them twice (up to the cap). A value outside the event's bid range rejects
//! the whole submission; the range is read under the event's lock, together
//! with the cap.

use crate::entities::{Bid, Event};
use crate::framework::EventLocks;
use crate::store::{EventStore, StoreError};
use kanau::processor::Processor;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors that can occur while placing bids.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Event not found
    #[error("event not found: {0}")]
    NotFound(Uuid),

    /// Event exists but is still a draft
    #[error("event is not published: {0}")]
    NotPublished(Uuid),

    /// A value lies outside the event's bid range
    #[error("bid {value} is outside the allowed range {minimum}..={maximum}")]
    OutOfRange {
        value: i64,
        minimum: i64,
        maximum: i64,
    },
}

/// Place `values` on behalf of `participant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBids {
    pub event_id: Uuid,
    pub participant: String,
    pub values: Vec<i64>,
}

/// Bid intake for all events.
#[derive(Clone)]
pub struct BidLedger {
    store: Arc<dyn EventStore>,
    locks: EventLocks,
}

impl BidLedger {
    pub fn new(store: Arc<dyn EventStore>, locks: EventLocks) -> Self {
        Self { store, locks }
    }

    /// Place bids and return how many were accepted.
    pub async fn submit_bids(
        &self,
        event_id: Uuid,
        participant: impl Into<String>,
        values: Vec<i64>,
    ) -> Result<usize, LedgerError> {
        self.process(SubmitBids {
            event_id,
            participant: participant.into(),
            values,
        })
        .await
    }
}

/// Build the bids `participant` is still allowed to place, in candidate order.
pub fn accept_bids(
    event: &Event,
    participant: &str,
    values: &[i64],
    now: OffsetDateTime,
) -> Vec<Bid> {
    let cap = usize::try_from(event.max_bids_per_user).unwrap_or(usize::MAX);
    let remaining = cap.saturating_sub(event.bid_count_of(participant));
    values
        .iter()
        .take(remaining)
        .map(|value| Bid::new(participant, *value, now))
        .collect()
}

impl Processor<SubmitBids> for BidLedger {
    type Output = usize;
    type Error = LedgerError;

    #[tracing::instrument(skip_all, err, fields(event_id = %submit.event_id), name = "BidLedger:SubmitBids")]
    async fn process(&self, submit: SubmitBids) -> Result<usize, LedgerError> {
        let SubmitBids {
            event_id,
            participant,
            values,
        } = submit;

        let _guard = self.locks.lock(event_id).await;

        let mut event = self
            .store
            .get(event_id)
            .await?
            .ok_or(LedgerError::NotFound(event_id))?;
        if !event.is_published() {
            return Err(LedgerError::NotPublished(event_id));
        }
        if let Some(&value) = values.iter().find(|v| !event.accepts_value(**v)) {
            return Err(LedgerError::OutOfRange {
                value,
                minimum: event.minimum_bid,
                maximum: event.maximum_bid,
            });
        }

        let accepted = accept_bids(&event, &participant, &values, OffsetDateTime::now_utc());
        let accepted_count = accepted.len();
        if accepted_count == 0 {
            debug!(%event_id, %participant, submitted = values.len(), "Bid cap reached, nothing accepted");
            return Ok(0);
        }

        event.bids.extend(accepted);
        self.store.upsert(event).await?;

        info!(
            %event_id,
            %participant,
            accepted = accepted_count,
            rejected = values.len() - accepted_count,
            "Bids placed"
        );
        Ok(accepted_count)
    }
}
