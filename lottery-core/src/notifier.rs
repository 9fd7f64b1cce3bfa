//! Outbound notification seam used by the scheduler.
//!
//! A notifier is fire-and-forget: its failures are logged by the caller and
//! never undo a draw. Implementations must not wait on delivery, since the
//! scheduler calls them while holding the event's lock.

use crate::events::{Announcement, AnnouncementSender};
use crate::utils::winner_selection::DrawResult;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Errors that can occur while handing off an announcement.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The announcement channel has no receiver anymore
    #[error("announcement channel closed")]
    ChannelClosed,

    /// The announcement queue is full, the announcement was dropped
    #[error("announcement queue full")]
    QueueFull,

    /// The underlying transport rejected the announcement
    #[error("announcement delivery failed: {0}")]
    Delivery(String),
}

/// Receives "occurrence opened" and "occurrence drawn" notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn announce_open(&self, event_id: Uuid) -> Result<(), NotifyError>;

    async fn announce_result(&self, event_id: Uuid, result: &DrawResult)
    -> Result<(), NotifyError>;
}

/// Notifier that queues announcements for the `AnnouncementDispatcher`.
///
/// Announcements are dropped rather than awaited when the queue is full.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: AnnouncementSender,
}

impl ChannelNotifier {
    pub fn new(tx: AnnouncementSender) -> Self {
        Self { tx }
    }

    fn send(&self, announcement: Announcement) -> Result<(), NotifyError> {
        self.tx.try_send(announcement).map_err(|e| match e {
            TrySendError::Full(_) => NotifyError::QueueFull,
            TrySendError::Closed(_) => NotifyError::ChannelClosed,
        })
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn announce_open(&self, event_id: Uuid) -> Result<(), NotifyError> {
        self.send(Announcement::Opened { event_id })
    }

    async fn announce_result(
        &self,
        event_id: Uuid,
        result: &DrawResult,
    ) -> Result<(), NotifyError> {
        self.send(Announcement::Concluded {
            event_id,
            winning_value: result.winning_value,
            winners: result.winners.clone(),
        })
    }
}
