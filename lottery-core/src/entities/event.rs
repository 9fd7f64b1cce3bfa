use crate::utils::recurrence::{first_draw_instant, next_draw_instant};
use lottery_sdk::objects::{
    ActiveEventResponse, BidResponse, EventResponse, EventStatus as SdkEventStatus,
    SelectionRule as SdkSelectionRule,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Default time an event stays open: one week.
pub const DEFAULT_DURATION_MS: u64 = 7 * 24 * 60 * 60 * 1000;
pub const DEFAULT_MINIMUM_BID: i64 = 1;
pub const DEFAULT_MAXIMUM_BID: i64 = 1000;

/// Winner selection rule, persisted form.
///
/// For API/DTO use, see `lottery_sdk::objects::SelectionRule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionRule {
    Simple,
    LowestUnique,
}

impl From<SelectionRule> for SdkSelectionRule {
    fn from(value: SelectionRule) -> Self {
        match value {
            SelectionRule::Simple => SdkSelectionRule::Simple,
            SelectionRule::LowestUnique => SdkSelectionRule::LowestUnique,
        }
    }
}

impl From<SdkSelectionRule> for SelectionRule {
    fn from(value: SdkSelectionRule) -> Self {
        match value {
            SdkSelectionRule::Simple => SelectionRule::Simple,
            SdkSelectionRule::LowestUnique => SelectionRule::LowestUnique,
        }
    }
}

/// Publication status, persisted form.
///
/// Only `Published` events are watched by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
}

impl From<EventStatus> for SdkEventStatus {
    fn from(value: EventStatus) -> Self {
        match value {
            EventStatus::Draft => SdkEventStatus::Draft,
            EventStatus::Published => SdkEventStatus::Published,
        }
    }
}

/// A placed bid. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub participant: String,
    pub value: i64,
    /// Only used to order bids that share a value.
    #[serde(with = "time::serde::rfc3339")]
    pub placed_at: OffsetDateTime,
}

impl Bid {
    pub fn new(participant: impl Into<String>, value: i64, placed_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            participant: participant.into(),
            value,
            placed_at,
        }
    }
}

/// A lottery event together with its bid pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prize: Option<String>,
    /// Where announcements for this event should be posted.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    pub selection_rule: SelectionRule,
    pub status: EventStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    pub duration_ms: u64,
    /// Zero means the event draws once.
    pub repeat_interval_ms: u64,
    pub winner_count: u32,
    pub max_bids_per_user: u32,
    pub minimum_bid: i64,
    pub maximum_bid: i64,
    /// Open instant of the most recent occurrence whose opening was announced.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub announced_through: Option<OffsetDateTime>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

impl Event {
    /// Create a draft with the default scheduling parameters.
    ///
    /// The start instant is `now` truncated to the minute.
    pub fn draft(title: impl Into<String>, now: OffsetDateTime) -> Self {
        let start_at = now
            .replace_second(0)
            .and_then(|t| t.replace_nanosecond(0))
            .unwrap_or(now);
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            prize: None,
            channel: None,
            creator: None,
            selection_rule: SelectionRule::Simple,
            status: EventStatus::Draft,
            start_at,
            duration_ms: DEFAULT_DURATION_MS,
            repeat_interval_ms: 0,
            winner_count: 1,
            max_bids_per_user: 1,
            minimum_bid: DEFAULT_MINIMUM_BID,
            maximum_bid: DEFAULT_MAXIMUM_BID,
            announced_through: None,
            bids: Vec::new(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == EventStatus::Published
    }

    pub fn repeats(&self) -> bool {
        self.repeat_interval_ms > 0
    }

    pub fn duration(&self) -> Duration {
        millis(self.duration_ms)
    }

    pub fn repeat_interval(&self) -> Duration {
        millis(self.repeat_interval_ms)
    }

    /// `None` when `start_at + duration` is not representable.
    pub fn first_draw_at(&self) -> Option<OffsetDateTime> {
        first_draw_instant(self.start_at, self.duration())
    }

    /// Next draw instant as seen at `now`, or `None` once a one-shot event expired.
    pub fn next_draw_at(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        next_draw_instant(self.start_at, self.duration(), self.repeat_interval(), now)
    }

    /// Whether the occurrence opening at `open_at` has already been announced.
    pub fn is_announced_for(&self, open_at: OffsetDateTime) -> bool {
        self.announced_through.is_some_and(|t| t >= open_at)
    }

    /// Number of bids `participant` has already placed.
    pub fn bid_count_of(&self, participant: &str) -> usize {
        self.bids
            .iter()
            .filter(|b| b.participant == participant)
            .count()
    }

    pub fn accepts_value(&self, value: i64) -> bool {
        (self.minimum_bid..=self.maximum_bid).contains(&value)
    }

    /// Build the API response as seen at `now`.
    pub fn to_response(&self, now: OffsetDateTime) -> EventResponse {
        EventResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            prize: self.prize.clone(),
            channel: self.channel.clone(),
            creator: self.creator.clone(),
            selection_rule: self.selection_rule.into(),
            status: self.status.into(),
            start_at: self.start_at,
            duration_ms: self.duration_ms,
            repeat_interval_ms: self.repeat_interval_ms,
            winner_count: self.winner_count,
            max_bids_per_user: self.max_bids_per_user,
            minimum_bid: self.minimum_bid,
            maximum_bid: self.maximum_bid,
            next_draw_at: self.next_draw_at(now),
            bids: self.bids.iter().map(BidResponse::from).collect(),
        }
    }

    /// Participant view, or `None` when no draw is ahead at `now`.
    pub fn to_active_response(&self, now: OffsetDateTime) -> Option<ActiveEventResponse> {
        if !self.is_published() {
            return None;
        }
        let next_draw_at = self.next_draw_at(now)?;
        Some(ActiveEventResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            prize: self.prize.clone(),
            selection_rule: self.selection_rule.into(),
            max_bids_per_user: self.max_bids_per_user,
            minimum_bid: self.minimum_bid,
            maximum_bid: self.maximum_bid,
            next_draw_at,
            bid_count: self.bids.len(),
        })
    }
}

impl From<&Bid> for BidResponse {
    fn from(bid: &Bid) -> Self {
        BidResponse {
            id: bid.id,
            participant: bid.participant.clone(),
            value: bid.value,
            placed_at: bid.placed_at,
        }
    }
}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}
