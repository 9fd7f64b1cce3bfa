//! Event (lottery) request and response types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::bid::BidResponse;

/// How winners are picked when an occurrence is drawn.
///
/// This is the API/DTO version. For the persisted form, see
/// `lottery-core::entities::SelectionRule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionRule {
    /// A uniformly random distinct value wins.
    Simple,
    /// The lowest value chosen by exactly one bid wins.
    LowestUnique,
}

impl std::fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionRule::Simple => write!(f, "SIMPLE"),
            SelectionRule::LowestUnique => write!(f, "LOWEST_UNIQUE"),
        }
    }
}

/// Publication status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
}

/// Request body for creating a new draft event.
///
/// Every scheduling field is optional; omitted fields take the defaults of a
/// fresh draft (start now, one week long, one-shot, one winner, one bid each).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prize: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub selection_rule: Option<SelectionRule>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub repeat_interval_ms: Option<u64>,
    #[serde(default)]
    pub winner_count: Option<u32>,
    #[serde(default)]
    pub max_bids_per_user: Option<u32>,
    #[serde(default)]
    pub minimum_bid: Option<i64>,
    #[serde(default)]
    pub maximum_bid: Option<i64>,
}

/// Request body for replacing the editable fields of an event.
///
/// Bids, publication status and the announcement marker are never touched
/// by an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prize: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    pub selection_rule: SelectionRule,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    pub duration_ms: u64,
    pub repeat_interval_ms: u64,
    pub winner_count: u32,
    pub max_bids_per_user: u32,
    pub minimum_bid: i64,
    pub maximum_bid: i64,
}

/// Full event detail returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub prize: Option<String>,
    pub channel: Option<String>,
    pub creator: Option<String>,
    pub selection_rule: SelectionRule,
    pub status: EventStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    pub duration_ms: u64,
    pub repeat_interval_ms: u64,
    pub winner_count: u32,
    pub max_bids_per_user: u32,
    pub minimum_bid: i64,
    pub maximum_bid: i64,
    /// Next draw instant, absent once a one-shot event has expired.
    #[serde(with = "time::serde::rfc3339::option")]
    pub next_draw_at: Option<OffsetDateTime>,
    pub bids: Vec<BidResponse>,
}

/// Participant view of an event that still has a draw ahead.
///
/// Individual bids are not exposed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub prize: Option<String>,
    pub selection_rule: SelectionRule,
    pub max_bids_per_user: u32,
    pub minimum_bid: i64,
    pub maximum_bid: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub next_draw_at: OffsetDateTime,
    pub bid_count: usize,
}

/// Kind of an armed in-process timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduledJobKind {
    Draw,
    Announce,
}

/// Snapshot of one armed timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJobResponse {
    pub event_id: Uuid,
    pub kind: ScheduledJobKind,
    #[serde(with = "time::serde::rfc3339")]
    pub fire_at: OffsetDateTime,
}

/// Result of a manual reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    /// Number of published events that ended up with an armed draw.
    pub armed_events: usize,
    pub jobs: Vec<ScheduledJobResponse>,
}
