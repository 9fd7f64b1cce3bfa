//! Announcement event definitions.
//!
//! Announcements carry only what the draw decided. Dispatchers re-fetch the
//! event for titles and channels, so edits made after the draw still show up.

use crate::entities::Bid;
use uuid::Uuid;

/// Something the outside world should be told about an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    /// An occurrence opened for bidding.
    Opened { event_id: Uuid },
    /// An occurrence was drawn. `winning_value` is `None` when nobody won.
    Concluded {
        event_id: Uuid,
        winning_value: Option<i64>,
        winners: Vec<Bid>,
    },
}

impl Announcement {
    pub fn event_id(&self) -> Uuid {
        match self {
            Announcement::Opened { event_id, .. } => *event_id,
            Announcement::Concluded { event_id, .. } => *event_id,
        }
    }
}
