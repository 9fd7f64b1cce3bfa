//! Webhook payload types for occurrence announcements.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One winning bid as reported in a draw result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerEntry {
    pub bid_id: Uuid,
    pub participant: String,
    pub value: i64,
}

/// Payload posted to the announcement webhook.
///
/// The `event_type` tag tells receivers which variant they got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AnnouncementPayload {
    /// An occurrence has opened for bidding.
    EventOpened {
        event_id: Uuid,
        title: String,
        channel: Option<String>,
        prize: Option<String>,
        timestamp: i64,
    },
    /// An occurrence has been drawn.
    ///
    /// `winning_value` is `None` and `winners` is empty when nobody won.
    DrawConcluded {
        event_id: Uuid,
        title: String,
        channel: Option<String>,
        winning_value: Option<i64>,
        winners: Vec<WinnerEntry>,
        timestamp: i64,
    },
}

impl AnnouncementPayload {
    /// The event this announcement is about.
    pub fn event_id(&self) -> Uuid {
        match self {
            AnnouncementPayload::EventOpened { event_id, .. } => *event_id,
            AnnouncementPayload::DrawConcluded { event_id, .. } => *event_id,
        }
    }
}
